//! # Nudge Store
//!
//! Persistence for per-user preference vectors and the service that ties
//! storage to the bandit numerics.
//!
//! - [`ScoreStore`]: async load/save/remove contract, keyed per user
//! - [`MemoryScoreStore`]: process-local backend
//! - [`SqliteScoreStore`]: durable backend on SQLite
//! - [`GenreSelectionService`]: select a genre, reinforce a genre

pub mod memory;
pub mod service;
pub mod sqlite;
pub mod store;

pub use memory::MemoryScoreStore;
pub use service::GenreSelectionService;
pub use sqlite::SqliteScoreStore;
pub use store::{decode_scores, encode_scores, open_store, score_key, ScoreStore, StoreError};
