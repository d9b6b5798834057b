/*!
common/src/lib.rs

Shared configuration types and storage helpers for newsdesk.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default file with an override file
- Environment overrides for the backend base URL
- A helper to open the SQLite file backing the admin token store
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

pub mod token_store;

pub use token_store::{MemoryTokenStore, SqliteTokenStore, TokenStore, ADMIN_TOKEN_KEY};

/// Backend base URL used when neither the config nor the environment sets one.
pub const DEFAULT_API_BASE_URL: &str = "https://cj-api.wsky.fun/api";

/// Request timeout applied to every backend call unless configured otherwise.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Environment variable overriding `[api] base_url`.
pub const API_BASE_URL_ENV: &str = "NEWSDESK_API_BASE_URL";

/// Backend API configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Absolute base URL every request path is appended to (e.g. "https://host/api")
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Where the admin bearer token is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenStoreConfig {
    /// Path to the sqlite file holding the token (e.g. "data/newsdesk.db")
    pub path: String,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            path: "data/newsdesk.db".to_string(),
        }
    }
}

/// One forwarding rule of the development proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRuleConfig {
    /// Path prefix matched on incoming requests ("/gold-api")
    pub prefix: String,
    /// Upstream origin, scheme and host only ("https://www.huilvbiao.com")
    pub target: String,
    /// Replacement for `prefix` in the forwarded path; `None` keeps the path as is
    pub rewrite: Option<String>,
    /// Fixed `referer` header sent upstream
    pub referer: Option<String>,
}

impl ProxyRuleConfig {
    fn new(prefix: &str, target: &str, rewrite: Option<&str>, referer: Option<&str>) -> Self {
        Self {
            prefix: prefix.to_string(),
            target: target.to_string(),
            rewrite: rewrite.map(str::to_string),
            referer: referer.map(str::to_string),
        }
    }
}

/// Development proxy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub bind: String,
    pub port: u16,
    pub rules: Vec<ProxyRuleConfig>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5001,
            rules: vec![
                ProxyRuleConfig::new("/api", "https://cj-api.wsky.fun", None, None),
                ProxyRuleConfig::new(
                    "/gold-api",
                    "https://www.huilvbiao.com",
                    Some("/api"),
                    Some("https://www.huilvbiao.com/gold"),
                ),
                ProxyRuleConfig::new(
                    "/silver-api",
                    "https://www.huilvbiao.com",
                    Some("/api"),
                    Some("https://www.huilvbiao.com/silver"),
                ),
            ],
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub token_store: TokenStoreConfig,
    pub proxy: ProxyConfig,
}

impl Config {
    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence). Missing files are
    /// skipped and any key left unset falls back to the built-in defaults.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variables. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(%base_url, "api base url overridden from environment");
            self.api.base_url = base_url;
        }
    }

    /// Reject `[api]` values that would only fail later at request time.
    ///
    /// Proxy rules are checked separately by [`ProxyConfig::validate`], since only
    /// the proxy subcommand uses them.
    pub fn validate(&self) -> Result<()> {
        check_http_url(&self.api.base_url).context("invalid [api] base_url")?;
        if self.api.timeout_seconds == 0 {
            bail!("[api] timeout_seconds must be greater than zero");
        }
        Ok(())
    }
}

impl ProxyConfig {
    /// Every rule needs an absolute prefix and an http(s) target.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if !rule.prefix.starts_with('/') {
                bail!("proxy rule prefix must start with '/': {}", rule.prefix);
            }
            check_http_url(&rule.target)
                .with_context(|| format!("invalid target for proxy rule {}", rule.prefix))?;
        }
        Ok(())
    }
}

fn check_http_url(raw: &str) -> Result<()> {
    let url = url::Url::parse(raw).with_context(|| format!("not an absolute URL: {}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("unsupported scheme '{}' in {}", other, raw),
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Initialize an SQLite connection pool.
///
/// This function will create the parent directory if necessary, ensure the DB file exists
/// (attempting to create it if missing), and return a configured `SqlitePool`. The token
/// store issues one tiny query per request, so the pool is kept small.
///
/// Example:
///   let pool = init_db_pool("data/newsdesk.db").await?;
pub async fn init_db_pool(path: &str) -> Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create DB parent directory: {}", parent.display())
            })?;
        }
    }

    // Creating the file up front surfaces permission or path problems with a clearer
    // error than the SQLite connection attempt would.
    tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to create or open DB file: {}", path))?;

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to sqlite database at path: {}", path))?;

    Ok(pool)
}
