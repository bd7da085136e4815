use thiserror::Error;

use crate::genre::Genre;

/// Caller-contract violations.
///
/// Numerical edge cases and storage degradations are recovered where they
/// happen and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NudgeError {
    #[error("unknown genre: {0:?}")]
    UnknownGenre(String),

    #[error("preference vector must have {expected} entries, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("genre {0} appears more than once")]
    DuplicateGenre(Genre),

    #[error("score for genre {0} is NaN")]
    NanScore(Genre),

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type NudgeResult<T> = Result<T, NudgeError>;

impl NudgeError {
    pub fn invalid_parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }
}
