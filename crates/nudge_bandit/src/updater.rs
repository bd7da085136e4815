//! Gradient-bandit preference update.
//!
//! Stochastic gradient ascent on expected reward under a softmax policy:
//!
//! - chosen genre:  `H += lr * (R - b) * (1 - p)`
//! - every other:   `H -= lr * (R - b) * p`
//!
//! Reward above the baseline pulls the chosen genre up and pushes the rest
//! down in proportion to how likely they currently are. Results are clamped
//! to `[-score_bound, score_bound]` so long histories cannot diverge.

use nudge_core::{Genre, LearningConfig, NudgeError, NudgeResult, PreferenceVector, GENRE_COUNT};

use crate::softmax::probabilities;

/// Update rule parameters.
///
/// The defaults are the operating point used for every reinforcement:
/// learning rate 0.1, reward 1.0, baseline 0.5, scores bounded at ±100.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBandit {
    pub learning_rate: f64,
    pub reward: f64,
    pub baseline: f64,
    pub score_bound: f64,
}

impl GradientBandit {
    pub fn new() -> Self {
        Self::from_validated(&LearningConfig::default())
    }

    pub fn from_config(config: &LearningConfig) -> NudgeResult<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: &LearningConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            reward: config.reward,
            baseline: config.baseline,
            score_bound: config.score_bound,
        }
    }

    /// Reject parameters that would make an update meaningless or non-finite.
    pub fn validate(&self) -> NudgeResult<()> {
        LearningConfig {
            learning_rate: self.learning_rate,
            reward: self.reward,
            baseline: self.baseline,
            score_bound: self.score_bound,
        }
        .validate()
    }

    /// New preference vector after reinforcing `chosen`. The input is untouched.
    ///
    /// The result is raw scores, not probabilities.
    pub fn update(&self, scores: &PreferenceVector, chosen: Genre) -> NudgeResult<PreferenceVector> {
        self.validate()?;

        let chosen_idx = scores
            .position(chosen)
            .ok_or_else(|| NudgeError::UnknownGenre(chosen.to_string()))?;

        let p = probabilities(scores).values();
        let old = scores.scores();
        let step = self.learning_rate * (self.reward - self.baseline);
        let bound = self.score_bound;

        let new: [f64; GENRE_COUNT] = std::array::from_fn(|i| {
            let delta = if i == chosen_idx {
                step * (1.0 - p[i])
            } else {
                -step * p[i]
            };
            (old[i] + delta).clamp(-bound, bound)
        });

        tracing::debug!(%chosen, ?old, ?new, "Applied gradient bandit update");
        scores.with_scores(new)
    }
}

impl Default for GradientBandit {
    fn default() -> Self {
        Self::new()
    }
}

/// One update with explicit parameters and the default score bound.
pub fn update(
    scores: &PreferenceVector,
    chosen: Genre,
    learning_rate: f64,
    reward: f64,
    baseline: f64,
) -> NudgeResult<PreferenceVector> {
    GradientBandit {
        learning_rate,
        reward,
        baseline,
        ..GradientBandit::new()
    }
    .update(scores, chosen)
}
