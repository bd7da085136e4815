use anyhow::Result;
use async_trait::async_trait;
use nudge_core::{PreferenceVector, StoreBackend, StoreConfig};
use std::sync::Arc;
use thiserror::Error;

use crate::{MemoryScoreStore, SqliteScoreStore};

#[derive(Error, Debug)]
pub enum StoreError {
    /// The payload under `key` did not decode to a whole preference vector.
    #[error("malformed genre scores at {key}: {reason}")]
    Malformed { key: String, reason: String },

    #[error("score store unavailable during {operation}: {source}")]
    Unavailable {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    pub fn malformed(key: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unavailable(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Key-value storage for preference vectors, one entry per user.
///
/// A load either yields a whole vector, nothing, or an error; there are no
/// partial results. Implementations must not hand back a vector that failed
/// validation: those surface as [`StoreError::Malformed`].
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<PreferenceVector>, StoreError>;

    /// Overwrite whatever is stored under `key`.
    async fn save(&self, key: &str, scores: &PreferenceVector) -> Result<(), StoreError>;

    /// Forget `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Storage key for a user's preference vector.
pub fn score_key(user_id: &str) -> String {
    format!("genre_scores:{}", user_id)
}

/// JSON array of `{"genre", "score"}` objects.
///
/// Non-finite scores have no JSON form and are refused.
pub fn encode_scores(key: &str, scores: &PreferenceVector) -> Result<String, StoreError> {
    if let Some(bad) = scores.iter().find(|e| !e.score.is_finite()) {
        return Err(StoreError::malformed(
            key,
            format!("non-finite score {} for {}", bad.score, bad.genre),
        ));
    }
    serde_json::to_string(scores).map_err(|e| StoreError::malformed(key, e))
}

pub fn decode_scores(key: &str, payload: &str) -> Result<PreferenceVector, StoreError> {
    serde_json::from_str(payload).map_err(|e| StoreError::malformed(key, e))
}

/// Build the backend named in `config`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn ScoreStore>> {
    let store: Arc<dyn ScoreStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryScoreStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteScoreStore::new(&config.db_path).await?),
    };
    Ok(store)
}
