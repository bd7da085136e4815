//! Genres and the per-user preference state built on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NudgeError, NudgeResult};

/// Number of genres. Every preference and probability vector has exactly this length.
pub const GENRE_COUNT: usize = 4;

/// Suggestion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    /// Resting, quiet, low-arousal activities
    Relax,
    /// Light exercise, tidying up, anything that gets the body moving
    Move,
    /// Drawing, making, other creative expression
    Creative,
    /// Music and rhythm
    Music,
}

impl Genre {
    /// Canonical order, used for initialization and whenever a fixed order is needed.
    pub const ALL: [Genre; GENRE_COUNT] = [Genre::Relax, Genre::Move, Genre::Creative, Genre::Music];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Relax => "RELAX",
            Genre::Move => "MOVE",
            Genre::Creative => "CREATIVE",
            Genre::Music => "MUSIC",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = NudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| NudgeError::UnknownGenre(s.to_string()))
    }
}

/// One (genre, raw preference score) pair.
///
/// The `key`/`value` aliases accept payloads written by the browser client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenreScore {
    #[serde(alias = "key")]
    pub genre: Genre,
    #[serde(alias = "value")]
    pub score: f64,
}

impl GenreScore {
    pub fn new(genre: Genre, score: f64) -> Self {
        Self { genre, score }
    }
}

/// Raw preference scores for one user, exactly one entry per genre.
///
/// Entry order is preserved from construction; sampling walks the entries
/// in this order. Deserialization runs the same validation as
/// [`PreferenceVector::try_from_entries`], so a decoded vector is always whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GenreScore>", into = "Vec<GenreScore>")]
pub struct PreferenceVector {
    entries: [GenreScore; GENRE_COUNT],
}

impl PreferenceVector {
    /// Build from scores given in [`Genre::ALL`] order.
    pub fn from_scores(scores: [f64; GENRE_COUNT]) -> NudgeResult<Self> {
        let mut entries = [GenreScore::new(Genre::Relax, 0.0); GENRE_COUNT];
        for (i, (genre, score)) in Genre::ALL.into_iter().zip(scores).enumerate() {
            if score.is_nan() {
                return Err(NudgeError::NanScore(genre));
            }
            entries[i] = GenreScore::new(genre, score);
        }
        Ok(Self { entries })
    }

    /// All scores zero: the uniform-preference state.
    pub fn zeroed() -> Self {
        Self {
            entries: Genre::ALL.map(|g| GenreScore::new(g, 0.0)),
        }
    }

    /// Validate an arbitrary list of entries: exactly four, no repeats, no NaN.
    pub fn try_from_entries(entries: Vec<GenreScore>) -> NudgeResult<Self> {
        let entries: [GenreScore; GENRE_COUNT] =
            entries
                .try_into()
                .map_err(|v: Vec<GenreScore>| NudgeError::InvalidLength {
                    expected: GENRE_COUNT,
                    actual: v.len(),
                })?;

        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.genre == entry.genre) {
                return Err(NudgeError::DuplicateGenre(entry.genre));
            }
            if entry.score.is_nan() {
                return Err(NudgeError::NanScore(entry.genre));
            }
        }

        // Four distinct values of a four-variant enum cover the whole set.
        Ok(Self { entries })
    }

    /// Same genres in the same order, new scores.
    pub fn with_scores(&self, scores: [f64; GENRE_COUNT]) -> NudgeResult<Self> {
        let mut entries = self.entries;
        for (entry, score) in entries.iter_mut().zip(scores) {
            if score.is_nan() {
                return Err(NudgeError::NanScore(entry.genre));
            }
            entry.score = score;
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[GenreScore; GENRE_COUNT] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenreScore> {
        self.entries.iter()
    }

    pub fn scores(&self) -> [f64; GENRE_COUNT] {
        self.entries.map(|e| e.score)
    }

    pub fn genres(&self) -> [Genre; GENRE_COUNT] {
        self.entries.map(|e| e.genre)
    }

    /// Index of `genre` in entry order.
    pub fn position(&self, genre: Genre) -> Option<usize> {
        self.entries.iter().position(|e| e.genre == genre)
    }

    pub fn score(&self, genre: Genre) -> Option<f64> {
        self.position(genre).map(|i| self.entries[i].score)
    }
}

impl Default for PreferenceVector {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl TryFrom<Vec<GenreScore>> for PreferenceVector {
    type Error = NudgeError;

    fn try_from(entries: Vec<GenreScore>) -> Result<Self, Self::Error> {
        Self::try_from_entries(entries)
    }
}

impl From<PreferenceVector> for Vec<GenreScore> {
    fn from(v: PreferenceVector) -> Self {
        v.entries.to_vec()
    }
}

impl fmt::Display for PreferenceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={:.4}", e.genre, e.score)?;
        }
        Ok(())
    }
}

/// Sampling distribution derived from a [`PreferenceVector`].
///
/// Same genre order as its source. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProbabilityVector {
    entries: [(Genre, f64); GENRE_COUNT],
}

impl ProbabilityVector {
    pub fn new(entries: [(Genre, f64); GENRE_COUNT]) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Genre, f64)> {
        self.entries.iter()
    }

    pub fn values(&self) -> [f64; GENRE_COUNT] {
        self.entries.map(|(_, p)| p)
    }

    pub fn genres(&self) -> [Genre; GENRE_COUNT] {
        self.entries.map(|(g, _)| g)
    }

    /// Probability of `genre`; 0.0 for a genre not in the vector.
    pub fn probability(&self, genre: Genre) -> f64 {
        self.entries
            .iter()
            .find(|(g, _)| *g == genre)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// Genre with the highest probability (first one wins ties).
    pub fn most_likely(&self) -> Genre {
        let mut best = self.entries[0];
        for entry in &self.entries[1..] {
            if entry.1 > best.1 {
                best = *entry;
            }
        }
        best.0
    }
}

impl fmt::Display for ProbabilityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (genre, p)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={:.1}%", genre, p * 100.0)?;
        }
        Ok(())
    }
}
