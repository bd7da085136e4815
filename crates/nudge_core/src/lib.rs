//! # Nudge Core
//!
//! Shared vocabulary for the adaptive genre-selection engine:
//!
//! - [`Genre`]: the closed set of four suggestion categories
//! - [`PreferenceVector`]: per-user raw preference scores, exactly one per genre
//! - [`ProbabilityVector`]: the derived sampling distribution (never persisted)
//! - [`NudgeConfig`]: TOML + env configuration for learning, init and storage

pub mod config;
pub mod error;
pub mod genre;

pub use config::{InitConfig, LearningConfig, NudgeConfig, StoreBackend, StoreConfig};
pub use error::{NudgeError, NudgeResult};
pub use genre::{Genre, GenreScore, PreferenceVector, ProbabilityVector, GENRE_COUNT};
