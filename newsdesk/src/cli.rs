//! Command-line surface: the admin dashboard and public viewer as subcommands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::Config;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::admin::AdminApi;
use crate::models::{
    token_from_body, AnalysisFilter, BatchFilter, Credentials, NewsFilter, SetupRequest,
    SiteCategoryInput, SiteFilter,
};
use crate::public::PublicApi;

#[derive(Parser, Debug)]
#[command(name = "newsdesk", version, about = "News/analysis backend clients and dev proxy")]
pub struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Backend base URL, overrides config and environment
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Latest news batch
    News,
    /// Latest analysis
    Analysis {
        /// Period covered, 3 or 7
        #[arg(long, default_value_t = 3)]
        days: u32,
    },
    /// Public site categories
    Categories,
    /// Admin dashboard operations
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Run the development reverse proxy
    Proxy,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Create the first admin account and store its token
    Setup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        setup_key: String,
    },
    /// Log in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// End the session and clear the stored token
    Logout,
    /// Run a news/analysis update now
    TriggerUpdate,
    /// Inspect or change the stored token
    #[command(subcommand)]
    Token(TokenCommand),
    #[command(subcommand)]
    Users(UserCommand),
    #[command(subcommand)]
    SiteCategories(SiteCategoryCommand),
    #[command(subcommand)]
    Sites(SiteCommand),
    #[command(subcommand)]
    Batches(BatchCommand),
    #[command(subcommand)]
    News(NewsCommand),
    #[command(subcommand)]
    Analysis(AnalysisCommand),
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    Show,
    Set { token: String },
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    List,
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    SetPassword {
        id: u64,
        #[arg(long)]
        password: String,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum SiteCategoryCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        sort: Option<i64>,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        sort: Option<i64>,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum SiteCommand {
    List {
        #[arg(long)]
        category_id: Option<u64>,
    },
    Create {
        /// Site record as JSON
        #[arg(long, value_parser = parse_json)]
        data: Value,
    },
    Update {
        id: u64,
        #[arg(long, value_parser = parse_json)]
        data: Value,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum BatchCommand {
    List {
        /// morning, noon or evening
        #[arg(long = "type")]
        batch_type: Option<String>,
        #[arg(long)]
        created_at_start: Option<String>,
        #[arg(long)]
        created_at_end: Option<String>,
    },
    /// News items of one batch
    News { batch_id: u64 },
    Delete { batch_id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum NewsCommand {
    List {
        #[arg(long)]
        batch_id: Option<u64>,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        created_at_start: Option<String>,
        #[arg(long)]
        created_at_end: Option<String>,
    },
    Create {
        #[arg(long, value_parser = parse_json)]
        data: Value,
    },
    Update {
        id: u64,
        #[arg(long, value_parser = parse_json)]
        data: Value,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum AnalysisCommand {
    List {
        #[arg(long)]
        batch_id: Option<u64>,
        /// 3_day or 7_day
        #[arg(long = "type")]
        analysis_type: Option<String>,
        #[arg(long)]
        created_at_start: Option<String>,
        #[arg(long)]
        created_at_end: Option<String>,
    },
    Create {
        #[arg(long, value_parser = parse_json)]
        data: Value,
    },
    Update {
        id: u64,
        #[arg(long, value_parser = parse_json)]
        data: Value,
    },
    Delete { id: u64 },
}

fn parse_json(raw: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))
}

/// Resolve `config.default.toml` and `config.toml` (or `--config`) from the
/// working directory, then layer environment and CLI overrides on top.
pub async fn load_config(args: &Args) -> Result<Config> {
    load_config_from(
        args,
        Path::new("config.default.toml"),
        Path::new("config.toml"),
        |key| std::env::var(key).ok(),
    )
    .await
}

/// Base URL precedence: `--base-url`, then the environment, then the files.
pub async fn load_config_from<F>(
    args: &Args,
    default_path: &Path,
    local_path: &Path,
    lookup: F,
) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let override_path = if let Some(p) = &args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p.as_path())
    } else {
        local_path.exists().then_some(local_path)
    };

    let mut config = Config::load_with_defaults(
        default_path.exists().then_some(default_path),
        override_path,
    )
    .await?;
    config.apply_env_from(lookup);
    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }
    config.validate()?;

    info!(default_file = ?default_path, override_file = ?override_path, base_url = %config.api.base_url, "configuration loaded");
    Ok(config)
}

/// Run a public viewer command and return the response body.
pub async fn run_public(api: &PublicApi, command: &Command) -> Result<Value> {
    let response = match command {
        Command::News => api.fetch_latest_news().await?,
        Command::Analysis { days } => api.fetch_analysis(*days).await?,
        Command::Categories => api.fetch_site_categories().await?,
        Command::Admin(_) | Command::Proxy => anyhow::bail!("not a public viewer command"),
    };
    info!(status = response.status.as_u16(), "public request completed");
    Ok(response.data)
}

/// Run an admin command and return the response body.
///
/// Login and setup persist the returned token; logout clears it even when the
/// backend call fails, since a rejected token is useless anyway.
pub async fn run_admin(api: &AdminApi, command: AdminCommand) -> Result<Value> {
    let body = match command {
        AdminCommand::Setup {
            username,
            password,
            setup_key,
        } => {
            let body = api
                .admin_setup(&SetupRequest {
                    username,
                    password,
                    setup_key,
                })
                .await?;
            store_session_token(api, &body).await?;
            body
        }
        AdminCommand::Login { username, password } => {
            let body = api
                .admin_login(&Credentials::new(username, password))
                .await?;
            store_session_token(api, &body).await?;
            body
        }
        AdminCommand::Logout => {
            let result = api.admin_logout().await;
            api.clear_admin_token().await?;
            info!("admin token cleared");
            result?
        }
        AdminCommand::TriggerUpdate => api.admin_trigger_update().await?,
        AdminCommand::Token(cmd) => match cmd {
            TokenCommand::Show => Value::String(api.get_admin_token().await?),
            TokenCommand::Set { token } => {
                api.set_admin_token(Some(&token)).await?;
                Value::Null
            }
            TokenCommand::Clear => {
                api.clear_admin_token().await?;
                Value::Null
            }
        },
        AdminCommand::Users(cmd) => match cmd {
            UserCommand::List => api.admin_user_list().await?,
            UserCommand::Create { username, password } => {
                api.admin_user_create(&Credentials::new(username, password))
                    .await?
            }
            UserCommand::SetPassword { id, password } => {
                api.admin_user_set_password(id, &password).await?
            }
            UserCommand::Delete { id } => api.admin_user_delete(id).await?,
        },
        AdminCommand::SiteCategories(cmd) => match cmd {
            SiteCategoryCommand::List => api.admin_site_category_list().await?,
            SiteCategoryCommand::Create { name, sort } => {
                api.admin_site_category_create(&SiteCategoryInput { name, sort })
                    .await?
            }
            SiteCategoryCommand::Update { id, name, sort } => {
                api.admin_site_category_update(id, &SiteCategoryInput { name, sort })
                    .await?
            }
            SiteCategoryCommand::Delete { id } => api.admin_site_category_delete(id).await?,
        },
        AdminCommand::Sites(cmd) => match cmd {
            SiteCommand::List { category_id } => {
                api.admin_site_list(&SiteFilter { category_id }).await?
            }
            SiteCommand::Create { data } => api.admin_site_create(&data).await?,
            SiteCommand::Update { id, data } => api.admin_site_update(id, &data).await?,
            SiteCommand::Delete { id } => api.admin_site_delete(id).await?,
        },
        AdminCommand::Batches(cmd) => match cmd {
            BatchCommand::List {
                batch_type,
                created_at_start,
                created_at_end,
            } => {
                api.admin_batch_list(&BatchFilter {
                    batch_type,
                    created_at_start,
                    created_at_end,
                })
                .await?
            }
            BatchCommand::News { batch_id } => api.admin_batch_news_list(batch_id).await?,
            BatchCommand::Delete { batch_id } => api.admin_batch_delete(batch_id).await?,
        },
        AdminCommand::News(cmd) => match cmd {
            NewsCommand::List {
                batch_id,
                keyword,
                created_at_start,
                created_at_end,
            } => {
                api.admin_news_list(&NewsFilter {
                    batch_id,
                    keyword,
                    created_at_start,
                    created_at_end,
                })
                .await?
            }
            NewsCommand::Create { data } => api.admin_news_create(&data).await?,
            NewsCommand::Update { id, data } => api.admin_news_update(id, &data).await?,
            NewsCommand::Delete { id } => api.admin_news_delete(id).await?,
        },
        AdminCommand::Analysis(cmd) => match cmd {
            AnalysisCommand::List {
                batch_id,
                analysis_type,
                created_at_start,
                created_at_end,
            } => {
                api.admin_analysis_list(&AnalysisFilter {
                    batch_id,
                    analysis_type,
                    created_at_start,
                    created_at_end,
                })
                .await?
            }
            AnalysisCommand::Create { data } => api.admin_analysis_create(&data).await?,
            AnalysisCommand::Update { id, data } => api.admin_analysis_update(id, &data).await?,
            AnalysisCommand::Delete { id } => api.admin_analysis_delete(id).await?,
        },
    };
    Ok(body)
}

async fn store_session_token(api: &AdminApi, body: &Value) -> Result<()> {
    match token_from_body(body) {
        Some(token) => {
            api.set_admin_token(Some(token)).await?;
            info!("admin token saved");
        }
        None => warn!("response carried no session token; stored token left unchanged"),
    }
    Ok(())
}
