use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::init_db_pool;

/// Key under which the admin bearer token is persisted.
pub const ADMIN_TOKEN_KEY: &str = "admin_token";

/// Persistence for the single admin bearer token.
///
/// The value is overwritten wholesale; an empty token is never stored.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Stored token, or an empty string when none is set
    async fn get_token(&self) -> Result<String>;

    /// Persist `token`; `None` or an empty string clears the store instead
    async fn set_token(&self, token: Option<&str>) -> Result<()>;

    async fn clear_token(&self) -> Result<()> {
        self.set_token(None).await
    }
}

/// Token store backed by a `settings` key/value table in SQLite.
#[derive(Clone)]
pub struct SqliteTokenStore {
    pool: SqlitePool,
}

impl SqliteTokenStore {
    /// Open (creating if needed) the sqlite file at `path`.
    pub async fn open(path: &str) -> Result<Self> {
        let pool = init_db_pool(path).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the `settings` table if missing.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create settings table")?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get_token(&self) -> Result<String> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(ADMIN_TOKEN_KEY)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to read admin token")?;
        Ok(value.unwrap_or_default())
    }

    async fn set_token(&self, token: Option<&str>) -> Result<()> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                sqlx::query(
                    "INSERT INTO settings (key, value) VALUES (?, ?) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                )
                .bind(ADMIN_TOKEN_KEY)
                .bind(token)
                .execute(&self.pool)
                .await
                .context("Failed to store admin token")?;
                tracing::debug!("admin token stored");
            }
            None => {
                sqlx::query("DELETE FROM settings WHERE key = ?")
                    .bind(ADMIN_TOKEN_KEY)
                    .execute(&self.pool)
                    .await
                    .context("Failed to clear admin token")?;
                tracing::debug!("admin token cleared");
            }
        }
        Ok(())
    }
}

/// Process-local token store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: RwLock::new(Some(token).filter(|t| !t.is_empty())),
        }
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get_token(&self) -> Result<String> {
        Ok(self.token.read().await.clone().unwrap_or_default())
    }

    async fn set_token(&self, token: Option<&str>) -> Result<()> {
        let mut guard = self.token.write().await;
        *guard = token.filter(|t| !t.is_empty()).map(str::to_string);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_sqlite_store() -> SqliteTokenStore {
        // A single connection, otherwise each pooled connection sees its own in-memory DB
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");
        SqliteTokenStore::from_pool(pool).await.expect("create store")
    }

    #[tokio::test]
    async fn sqlite_store_set_get_clear() {
        let store = memory_sqlite_store().await;
        assert_eq!(store.get_token().await.unwrap(), "");

        store.set_token(Some("abc")).await.unwrap();
        assert_eq!(store.get_token().await.unwrap(), "abc");

        store.set_token(Some("def")).await.unwrap();
        assert_eq!(store.get_token().await.unwrap(), "def");

        store.clear_token().await.unwrap();
        assert_eq!(store.get_token().await.unwrap(), "");
    }

    #[tokio::test]
    async fn empty_or_missing_token_clears() {
        let store = memory_sqlite_store().await;
        store.set_token(Some("abc")).await.unwrap();
        store.set_token(Some("")).await.unwrap();
        assert_eq!(store.get_token().await.unwrap(), "");

        store.set_token(Some("abc")).await.unwrap();
        store.set_token(None).await.unwrap();
        assert_eq!(store.get_token().await.unwrap(), "");
    }

    #[tokio::test]
    async fn sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tokens.db").to_string_lossy().to_string();

        let store = SqliteTokenStore::open(&path).await.expect("open store");
        store.set_token(Some("persisted")).await.unwrap();
        drop(store);

        let reopened = SqliteTokenStore::open(&path).await.expect("reopen store");
        assert_eq!(reopened.get_token().await.unwrap(), "persisted");
    }

    #[tokio::test]
    async fn memory_store_behaves_like_sqlite_store() {
        let store = MemoryTokenStore::with_token("");
        assert_eq!(store.get_token().await.unwrap(), "");

        store.set_token(Some("abc")).await.unwrap();
        assert_eq!(store.get_token().await.unwrap(), "abc");

        store.set_token(Some("")).await.unwrap();
        assert_eq!(store.get_token().await.unwrap(), "");
    }
}
