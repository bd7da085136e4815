//! Gaussian cold start via the Box-Muller transform.

use nudge_core::{Genre, InitConfig, NudgeResult, PreferenceVector};
use rand::distributions::{Distribution, Open01};
use rand::Rng;
use std::f64::consts::PI;

/// One normal draw: `sqrt(-2 ln u1) * cos(2 pi u2) * stddev + mean`.
///
/// `u1` comes from the open interval (0, 1) so `ln(u1)` is always finite.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, stddev: f64) -> f64 {
    let u1: f64 = Open01.sample(rng);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z * stddev + mean
}

/// Produces the first preference vector for a user with no stored state.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianInitializer {
    mean: f64,
    stddev: f64,
}

impl GaussianInitializer {
    /// Standard normal: mean 0, standard deviation 1.
    pub fn new() -> Self {
        Self {
            mean: 0.0,
            stddev: 1.0,
        }
    }

    pub fn from_config(config: &InitConfig) -> NudgeResult<Self> {
        config.validate()?;
        Ok(Self {
            mean: config.mean,
            stddev: config.stddev,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    /// One independent draw per genre, in [`Genre::ALL`] order.
    ///
    /// The scores are raw; no softmax is applied here.
    pub fn initialize<R: Rng + ?Sized>(&self, rng: &mut R) -> PreferenceVector {
        let scores = Genre::ALL.map(|_| gaussian(rng, self.mean, self.stddev));
        tracing::debug!(?scores, "Initialized genre scores");
        // Finite mean/stddev and u1 > 0 keep every draw finite.
        PreferenceVector::from_scores(scores).unwrap_or_default()
    }
}

impl Default for GaussianInitializer {
    fn default() -> Self {
        Self::new()
    }
}
