use async_trait::async_trait;
use nudge_core::PreferenceVector;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::store::{decode_scores, encode_scores, ScoreStore, StoreError};

/// Process-local store. Payloads are kept encoded so that loads go through
/// the same validation as the durable backend.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    payloads: RwLock<HashMap<String, String>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` verbatim, bypassing encoding.
    pub async fn insert_raw(&self, key: &str, payload: &str) {
        self.payloads
            .write()
            .await
            .insert(key.to_string(), payload.to_string());
    }

    pub async fn len(&self) -> usize {
        self.payloads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payloads.read().await.is_empty()
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn load(&self, key: &str) -> Result<Option<PreferenceVector>, StoreError> {
        let payloads = self.payloads.read().await;
        match payloads.get(key) {
            Some(payload) => decode_scores(key, payload).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, scores: &PreferenceVector) -> Result<(), StoreError> {
        let payload = encode_scores(key, scores)?;
        self.payloads.write().await.insert(key.to_string(), payload);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.payloads.write().await.remove(key);
        Ok(())
    }
}
