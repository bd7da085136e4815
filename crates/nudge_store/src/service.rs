//! Genre Selection Service - the two operations the suggestion feature calls
//!
//! - `select_genre`: which genre should the next suggestion come from
//! - `reinforce_genre`: the user acted on a suggestion, reinforce its genre
//!
//! State handling:
//! - Missing state → Gaussian cold start, persisted immediately
//! - Malformed state → treated as missing (re-initialized and overwritten)
//! - Store unavailable → ephemeral vector for this call only; nothing fails
//!
//! Calls for one user are not serialized here. A read-modify-write race
//! between two concurrent `reinforce_genre` calls for the same user loses
//! one update; callers that allow that must hold a per-user lock.

use nudge_bandit::{probabilities, sample, GaussianInitializer, GradientBandit};
use nudge_core::{Genre, NudgeConfig, NudgeResult, PreferenceVector, ProbabilityVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::store::{score_key, ScoreStore, StoreError};

pub struct GenreSelectionService {
    store: Arc<dyn ScoreStore>,
    bandit: GradientBandit,
    initializer: GaussianInitializer,
    rng: Mutex<StdRng>,
}

impl GenreSelectionService {
    /// Default learning parameters, standard-normal cold start, OS entropy.
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self::with_parts(
            store,
            GradientBandit::new(),
            GaussianInitializer::new(),
            StdRng::from_entropy(),
        )
    }

    pub fn from_config(store: Arc<dyn ScoreStore>, config: &NudgeConfig) -> NudgeResult<Self> {
        let bandit = GradientBandit::from_config(&config.learning)?;
        let initializer = GaussianInitializer::from_config(&config.init)?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::with_parts(store, bandit, initializer, rng))
    }

    pub fn with_parts(
        store: Arc<dyn ScoreStore>,
        bandit: GradientBandit,
        initializer: GaussianInitializer,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            bandit,
            initializer,
            rng: Mutex::new(rng),
        }
    }

    pub fn bandit(&self) -> &GradientBandit {
        &self.bandit
    }

    /// Pick the genre for the next suggestion. Never fails.
    ///
    /// Sampling is read-only: the stored vector only changes here on cold start.
    pub async fn select_genre(&self, user_id: &str) -> Genre {
        let scores = self.load_or_initialize(user_id).await;
        let genre = {
            let mut rng = self.rng.lock().await;
            sample(&scores, &mut *rng)
        };
        tracing::debug!(user_id, %genre, "Selected genre");
        genre
    }

    /// Reinforce `genre` for `user_id` and persist the result.
    ///
    /// Returns the new vector. Only invalid learning parameters are errors;
    /// storage trouble is logged and the update is kept in memory for this call.
    pub async fn reinforce_genre(&self, user_id: &str, genre: Genre) -> NudgeResult<PreferenceVector> {
        self.bandit.validate()?;

        let scores = self.load_or_initialize(user_id).await;
        let updated = self.bandit.update(&scores, genre)?;
        self.persist(&score_key(user_id), &updated).await;

        tracing::info!(user_id, %genre, "Reinforced genre");
        Ok(updated)
    }

    /// Parse `genre` and reinforce it. Unknown names are rejected before any
    /// state is read or written.
    pub async fn reinforce_named(&self, user_id: &str, genre: &str) -> NudgeResult<PreferenceVector> {
        let genre: Genre = genre.parse()?;
        self.reinforce_genre(user_id, genre).await
    }

    /// Current raw scores, initializing if needed.
    pub async fn preferences(&self, user_id: &str) -> PreferenceVector {
        self.load_or_initialize(user_id).await
    }

    /// Current sampling distribution, initializing if needed.
    pub async fn probabilities(&self, user_id: &str) -> ProbabilityVector {
        probabilities(&self.load_or_initialize(user_id).await)
    }

    /// Forget the user's state; the next call cold-starts.
    pub async fn reset(&self, user_id: &str) -> Result<(), StoreError> {
        self.store.remove(&score_key(user_id)).await?;
        tracing::info!(user_id, "Genre scores reset");
        Ok(())
    }

    async fn load_or_initialize(&self, user_id: &str) -> PreferenceVector {
        let key = score_key(user_id);
        match self.store.load(&key).await {
            Ok(Some(scores)) => scores,
            Ok(None) => {
                tracing::info!(user_id, "No genre scores found, initializing");
                let fresh = self.fresh().await;
                self.persist(&key, &fresh).await;
                fresh
            }
            Err(e @ StoreError::Malformed { .. }) => {
                tracing::warn!(user_id, "Discarding stored genre scores: {}", e);
                let fresh = self.fresh().await;
                self.persist(&key, &fresh).await;
                fresh
            }
            Err(e) => {
                tracing::warn!(user_id, "Using ephemeral genre scores: {}", e);
                self.fresh().await
            }
        }
    }

    async fn fresh(&self) -> PreferenceVector {
        let mut rng = self.rng.lock().await;
        self.initializer.initialize(&mut *rng)
    }

    async fn persist(&self, key: &str, scores: &PreferenceVector) {
        if let Err(e) = self.store.save(key, scores).await {
            tracing::warn!(key, "Failed to persist genre scores: {}", e);
        }
    }
}
