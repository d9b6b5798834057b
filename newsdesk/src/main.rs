/*
newsdesk - main.rs
Public viewer and admin dashboard for the news/analysis backend, plus the dev proxy.
*/

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use common::SqliteTokenStore;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use newsdesk::cli::{self, Args, Command};
use newsdesk::{proxy, AdminApi, PublicApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = cli::load_config(&args).await?;

    let output = match args.command {
        Command::Proxy => {
            proxy::launch_proxy(&config.proxy).await?;
            return Ok(());
        }
        Command::Admin(command) => {
            let store = SqliteTokenStore::open(&config.token_store.path)
                .await
                .with_context(|| format!("Failed to open token store at {}", config.token_store.path))?;
            let api = AdminApi::from_config(&config.api, Arc::new(store))?;
            cli::run_admin(&api, command).await
        }
        public => {
            let api = PublicApi::from_config(&config.api)?;
            cli::run_public(&api, &public).await
        }
    };

    match output {
        Ok(body) => {
            if !body.is_null() {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}
