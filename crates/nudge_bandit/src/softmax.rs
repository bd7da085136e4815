//! Numerically stable softmax.

use nudge_core::{PreferenceVector, ProbabilityVector};

/// Normalized exponentials of `values`, in input order.
///
/// The maximum is subtracted before exponentiating. A non-finite
/// exponential contributes zero mass, and if nothing is left the result is
/// uniform, so the output is always a valid distribution.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values
        .iter()
        .map(|v| {
            let e = (v - max).exp();
            if e.is_finite() {
                e
            } else {
                0.0
            }
        })
        .collect();

    let sum: f64 = exps.iter().sum();
    if sum == 0.0 {
        let uniform = 1.0 / values.len() as f64;
        return vec![uniform; values.len()];
    }

    exps.into_iter().map(|e| e / sum).collect()
}

/// Sampling distribution for a preference vector. Genres keep their order.
pub fn probabilities(scores: &PreferenceVector) -> ProbabilityVector {
    let genres = scores.genres();
    let p = softmax(&scores.scores());
    ProbabilityVector::new(std::array::from_fn(|i| (genres[i], p[i])))
}
