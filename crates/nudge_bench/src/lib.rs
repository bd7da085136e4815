//! nudge_bench: trajectory simulation tests for long-run bandit behavior.
//!
//! Validates what only shows up over many rounds:
//! - Convergence toward a user who always acts on one genre
//! - Score bounds holding over very long histories
//! - A user with no clear favorite staying spread out

use nudge_bandit::{probabilities, sample, GaussianInitializer, GradientBandit};
use nudge_core::{Genre, NudgeResult, PreferenceVector, GENRE_COUNT};
use rand::Rng;

/// Outcome of a simulated run.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub scores: PreferenceVector,
    /// How often each genre was selected, in [`Genre::ALL`] order.
    pub selections: [usize; GENRE_COUNT],
    pub reinforcements: usize,
}

/// Run `rounds` select/act cycles. `acts_on` decides whether the simulated
/// user engages with the selected genre; engagement is reinforced.
///
/// Any update error aborts the run.
pub fn simulate<R, F>(
    bandit: &GradientBandit,
    mut scores: PreferenceVector,
    rounds: usize,
    rng: &mut R,
    mut acts_on: F,
) -> NudgeResult<Trajectory>
where
    R: Rng + ?Sized,
    F: FnMut(Genre, &mut R) -> bool,
{
    let mut selections = [0usize; GENRE_COUNT];
    let mut reinforcements = 0;

    for _ in 0..rounds {
        let genre = sample(&scores, rng);
        if let Some(i) = Genre::ALL.iter().position(|g| *g == genre) {
            selections[i] += 1;
        }
        if acts_on(genre, rng) {
            scores = bandit.update(&scores, genre)?;
            reinforcements += 1;
        }
    }

    Ok(Trajectory {
        scores,
        selections,
        reinforcements,
    })
}

/// Cold-start a vector and simulate from it.
pub fn simulate_from_cold_start<R, F>(
    bandit: &GradientBandit,
    rounds: usize,
    rng: &mut R,
    acts_on: F,
) -> NudgeResult<Trajectory>
where
    R: Rng + ?Sized,
    F: FnMut(Genre, &mut R) -> bool,
{
    let start = GaussianInitializer::new().initialize(rng);
    simulate(bandit, start, rounds, rng, acts_on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_core::NudgeError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A user who only ever acts on MOVE should end up being offered MOVE
    /// almost exclusively.
    #[test]
    fn test_converges_to_favorite() {
        let bandit = GradientBandit::new();
        let mut rng = StdRng::seed_from_u64(42);

        let run = simulate_from_cold_start(&bandit, 10_000, &mut rng, |g, _| g == Genre::Move).unwrap();

        let p = probabilities(&run.scores).probability(Genre::Move);
        assert!(p > 0.9, "MOVE probability should dominate, got {}", p);
        assert!(run.reinforcements > 0);
    }

    /// Starting already biased against the favorite still recovers.
    #[test]
    fn test_recovers_from_bad_start() {
        let bandit = GradientBandit::new();
        let mut rng = StdRng::seed_from_u64(7);
        let start = PreferenceVector::from_scores([1.0, 1.0, -1.0, 1.0]).unwrap();

        let before = probabilities(&start).probability(Genre::Creative);
        let run = simulate(&bandit, start, 5000, &mut rng, |g, _| g == Genre::Creative).unwrap();
        let after = probabilities(&run.scores).probability(Genre::Creative);

        assert!(before < 0.05);
        assert!(
            after > 0.5,
            "CREATIVE should recover: {} -> {}",
            before,
            after
        );
    }

    /// Long histories with an aggressive learning rate never leave the bound.
    #[test]
    fn test_scores_stay_bounded() {
        let bandit = GradientBandit {
            learning_rate: 50.0,
            ..GradientBandit::new()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let run = simulate_from_cold_start(&bandit, 20_000, &mut rng, |_, _| true).unwrap();

        for entry in run.scores.iter() {
            assert!(
                entry.score.abs() <= bandit.score_bound,
                "{} escaped the bound: {}",
                entry.genre,
                entry.score
            );
        }
        assert_eq!(run.reinforcements, 20_000);
    }

    /// A user who engages with everything at the same rate has no reason to
    /// collapse onto one genre quickly; every genre keeps being offered.
    #[test]
    fn test_indifferent_user_keeps_variety() {
        let bandit = GradientBandit::new();
        let mut rng = StdRng::seed_from_u64(11);
        let start = PreferenceVector::zeroed();

        let run = simulate(&bandit, start, 400, &mut rng, |_, rng| rng.gen_bool(0.3)).unwrap();

        for (genre, count) in Genre::ALL.iter().zip(run.selections) {
            assert!(count > 0, "{} was never selected", genre);
        }
        assert_eq!(run.selections.iter().sum::<usize>(), 400);
    }

    /// Bad parameters surface as an error instead of a silently frozen run.
    #[test]
    fn test_invalid_bandit_aborts_simulation() {
        let bandit = GradientBandit {
            learning_rate: f64::NAN,
            ..GradientBandit::new()
        };
        let mut rng = StdRng::seed_from_u64(5);

        let err = simulate(&bandit, PreferenceVector::zeroed(), 10, &mut rng, |_, _| true)
            .unwrap_err();
        assert!(matches!(err, NudgeError::InvalidParameter { name: "learning_rate", .. }));

        // Never acting means never updating, so the same parameters are harmless
        let run = simulate(&bandit, PreferenceVector::zeroed(), 10, &mut rng, |_, _| false).unwrap();
        assert_eq!(run.reinforcements, 0);
    }
}
