//! # Nudge Bandit
//!
//! The numeric heart of genre selection. Everything here is pure,
//! closed-form arithmetic; randomness is always passed in as a `rand::Rng`
//! so that initialization and sampling are seedable.
//!
//! ## Pipeline
//!
//! 1. [`GaussianInitializer`] draws raw scores for a user with no history
//! 2. [`probabilities`] turns raw scores into a sampling distribution
//! 3. [`sample`] draws one genre by inverse-CDF over that distribution
//! 4. [`GradientBandit::update`] reinforces the genre the user acted on
//!
//! Scores stay raw between steps. Softmax is only applied at read time.

mod gaussian;
mod sampler;
mod softmax;
mod updater;

pub use gaussian::{gaussian, GaussianInitializer};
pub use sampler::{pick, sample};
pub use softmax::{probabilities, softmax};
pub use updater::{update, GradientBandit};
