use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use nudge_core::PreferenceVector;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;

use crate::store::{decode_scores, encode_scores, ScoreStore, StoreError};

/// Durable store: one row per user key, payload kept as JSON text.
#[derive(Clone)]
pub struct SqliteScoreStore {
    pool: Pool<Sqlite>,
}

impl SqliteScoreStore {
    /// Open (or create) the database at `db_path`. `":memory:"` gives a
    /// private in-memory database held open by a single connection.
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let in_memory = db_path.as_ref() == Path::new(":memory:");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());

        let mut options = SqlitePoolOptions::new();
        if in_memory {
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options
            .connect(&db_url)
            .await
            .with_context(|| format!("Failed to connect to SQLite database at {}", db_url))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS genre_scores (
                user_key TEXT PRIMARY KEY,
                scores_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create genre_scores table")?;
        Ok(())
    }

    /// Store `payload` verbatim, bypassing encoding.
    pub async fn insert_raw(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        self.upsert(key, payload).await
    }

    /// Close the pool. Every later call fails with [`StoreError::Unavailable`].
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn upsert(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO genre_scores (user_key, scores_json, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(user_key) DO UPDATE SET scores_json = excluded.scores_json, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::unavailable("save genre scores", e))?;
        Ok(())
    }
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    async fn load(&self, key: &str) -> Result<Option<PreferenceVector>, StoreError> {
        let row = sqlx::query("SELECT scores_json FROM genre_scores WHERE user_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable("load genre scores", e))?;

        match row {
            Some(row) => {
                let json: String = row
                    .try_get("scores_json")
                    .map_err(|e| StoreError::malformed(key, e))?;
                decode_scores(key, &json).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, scores: &PreferenceVector) -> Result<(), StoreError> {
        let payload = encode_scores(key, scores)?;
        self.upsert(key, &payload).await?;
        tracing::debug!(key, "Genre scores saved");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM genre_scores WHERE user_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable("remove genre scores", e))?;
        Ok(())
    }
}
