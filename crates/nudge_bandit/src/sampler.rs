//! Inverse-CDF sampling over the genre distribution.

use nudge_core::{Genre, PreferenceVector, ProbabilityVector, GENRE_COUNT};
use rand::Rng;

use crate::softmax::probabilities;

/// First genre whose cumulative probability exceeds `r`.
///
/// If rounding leaves the total just under `r`, the last genre is returned.
pub fn pick(probabilities: &ProbabilityVector, r: f64) -> Genre {
    let mut cumulative = 0.0;
    for (genre, p) in probabilities.iter() {
        cumulative += p;
        if r < cumulative {
            return *genre;
        }
    }
    probabilities.genres()[GENRE_COUNT - 1]
}

/// Draw one genre with probability equal to its softmax weight.
pub fn sample<R: Rng + ?Sized>(scores: &PreferenceVector, rng: &mut R) -> Genre {
    let p = probabilities(scores);
    let r: f64 = rng.gen();
    let genre = pick(&p, r);
    tracing::trace!(r, %genre, "Sampled genre");
    genre
}
