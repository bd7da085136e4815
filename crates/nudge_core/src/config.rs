use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{NudgeError, NudgeResult};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NudgeConfig {
    pub learning: LearningConfig,
    pub init: InitConfig,
    pub store: StoreConfig,
    /// Fixed RNG seed for reproducible runs. `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

impl NudgeConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: NudgeConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Check every numeric section.
    pub fn validate(&self) -> NudgeResult<()> {
        self.learning.validate()?;
        self.init.validate()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("NUDGE_LEARNING_RATE") {
            if let Ok(n) = v.parse() {
                self.learning.learning_rate = n;
            }
        }
        if let Ok(v) = std::env::var("NUDGE_REWARD") {
            if let Ok(n) = v.parse() {
                self.learning.reward = n;
            }
        }
        if let Ok(v) = std::env::var("NUDGE_BASELINE") {
            if let Ok(n) = v.parse() {
                self.learning.baseline = n;
            }
        }
        if let Ok(v) = std::env::var("NUDGE_STORE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.store.backend = StoreBackend::Memory,
                "sqlite" => self.store.backend = StoreBackend::Sqlite,
                other => tracing::warn!("Ignoring unknown NUDGE_STORE_BACKEND={}", other),
            }
        }
        if let Ok(v) = std::env::var("NUDGE_DB_PATH") {
            self.store.db_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("NUDGE_RNG_SEED") {
            if let Ok(n) = v.parse() {
                self.rng_seed = Some(n);
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Gradient-bandit update parameters.
///
/// Every observed user action is reinforced with the same `reward`; there is
/// no negative-reward pathway.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub learning_rate: f64,
    pub reward: f64,
    pub baseline: f64,
    /// Scores are clamped into `[-score_bound, score_bound]` after each update.
    pub score_bound: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            reward: 1.0,
            baseline: 0.5,
            score_bound: 100.0,
        }
    }
}

impl LearningConfig {
    pub fn validate(&self) -> NudgeResult<()> {
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(NudgeError::invalid_parameter("learning_rate", self.learning_rate));
        }
        if !self.reward.is_finite() {
            return Err(NudgeError::invalid_parameter("reward", self.reward));
        }
        if !self.baseline.is_finite() {
            return Err(NudgeError::invalid_parameter("baseline", self.baseline));
        }
        if !self.score_bound.is_finite() || self.score_bound <= 0.0 {
            return Err(NudgeError::invalid_parameter("score_bound", self.score_bound));
        }
        let step = self.learning_rate * (self.reward - self.baseline);
        if !step.is_finite() {
            return Err(NudgeError::invalid_parameter("learning_rate * (reward - baseline)", step));
        }
        Ok(())
    }
}

/// Gaussian cold-start parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    pub mean: f64,
    pub stddev: f64,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            mean: 0.0,
            stddev: 1.0,
        }
    }
}

impl InitConfig {
    pub fn validate(&self) -> NudgeResult<()> {
        if !self.mean.is_finite() {
            return Err(NudgeError::invalid_parameter("init.mean", self.mean));
        }
        if !self.stddev.is_finite() || self.stddev < 0.0 {
            return Err(NudgeError::invalid_parameter("init.stddev", self.stddev));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local, lost on exit
    Memory,
    /// SQLite file at `db_path`
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            db_path: PathBuf::from("nudge.db"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
