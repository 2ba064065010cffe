//! SQLite-backed key/value store for the persisted cart.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use bookstore_cart::KeyValueStore;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Device-local store in a single `kv_store` table.
///
/// The connection pool is opened lazily on first use, so constructing a
/// store never touches the disk.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    location: Location,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteKeyValueStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// A private in-memory database, gone when the store is dropped.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            pool: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// When `key` was last written, if it exists.
    pub async fn updated_at(&self, key: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
        let pool = self.get_pool().await?;

        let row = sqlx::query("SELECT updated_at FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .context("failed to read kv_store timestamp")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("updated_at")?;
        let at = DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .context("invalid updated_at timestamp in kv_store")?;
        Ok(Some(at))
    }

    /// Get the pool, opening the database on first use.
    async fn get_pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        let pool = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create data directory at {parent:?}"))?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                SqlitePoolOptions::new()
                    .connect_with(options)
                    .await
                    .with_context(|| format!("failed to open SQLite store at {path:?}"))?
            }
            Location::Memory => {
                // Each in-memory connection is its own database; keep exactly one alive.
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .context("invalid in-memory SQLite url")?;
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
                    .context("failed to open in-memory SQLite store")?
            }
        };

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv_store table")?;

        tracing::debug!(location = ?self.location, "opened local store");
        *guard = Some(pool.clone());
        Ok(pool)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let pool = self.get_pool().await?;

        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .with_context(|| format!("failed to read {key:?} from kv_store"))?;

        row.map(|row| row.try_get::<String, _>("value"))
            .transpose()
            .context("kv_store value is not text")
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let pool = self.get_pool().await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&pool)
        .await
        .with_context(|| format!("failed to upsert {key:?} in kv_store"))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let pool = self.get_pool().await?;

        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&pool)
            .await
            .with_context(|| format!("failed to delete {key:?} from kv_store"))?;

        Ok(())
    }
}
