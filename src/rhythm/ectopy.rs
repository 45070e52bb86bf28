//! Ectopy state machine.
//!
//! The scheduler owns one [`EctopyState`] value per synthesis run and
//! advances it with [`step`], a pure function of the current state and the
//! draws it is handed. An ectopic firing is followed by a single beat of
//! elevated "clustering" probability (couplets), then a refractory period of
//! 2-4 beats during which no ectopy can occur.

use crate::types::Real;
use crate::utils::Random;

/// Ectopy suppression state carried between scheduled beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EctopyState {
    /// Eligible to fire at the base probability.
    Normal,
    /// The previous beat was ectopic; clustering probability applies.
    JustFired,
    /// No ectopy for the remaining count of beats.
    Refractory(u8),
}

/// Advances the state by one scheduled beat.
///
/// Returns the successor state and whether an ectopic beat fires at this
/// position.
pub fn step(
    state: EctopyState,
    base_prob: Real,
    cluster_prob: Real,
    rng: &mut Random,
) -> (EctopyState, bool) {
    match state {
        EctopyState::Normal => {
            if rng.chance(base_prob) {
                (EctopyState::JustFired, true)
            } else {
                (EctopyState::Normal, false)
            }
        }
        EctopyState::JustFired => {
            let refractory = EctopyState::Refractory(rng.u32_range(2, 5) as u8);
            if rng.chance(cluster_prob) {
                (refractory, true)
            } else {
                (refractory, false)
            }
        }
        EctopyState::Refractory(n) => {
            if n > 1 {
                (EctopyState::Refractory(n - 1), false)
            } else {
                (EctopyState::Normal, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_fires_at_zero_probability() {
        let mut rng = Random::new(42);
        let mut state = EctopyState::Normal;
        for _ in 0..500 {
            let (next, fired) = step(state, 0.0, 0.0, &mut rng);
            assert!(!fired);
            assert_eq!(next, EctopyState::Normal);
            state = next;
        }
    }

    #[test]
    fn test_always_fires_at_unit_probability() {
        let mut rng = Random::new(42);
        let (state, fired) = step(EctopyState::Normal, 1.0, 0.0, &mut rng);
        assert!(fired);
        assert_eq!(state, EctopyState::JustFired);
    }

    #[test]
    fn test_fire_enters_refractory_after_cluster_window() {
        let mut rng = Random::new(42);
        let (state, _) = step(EctopyState::JustFired, 1.0, 0.0, &mut rng);
        match state {
            EctopyState::Refractory(n) => assert!((2..=4).contains(&n)),
            other => panic!("expected refractory, got {other:?}"),
        }
    }

    #[test]
    fn test_refractory_counts_down_to_normal() {
        let mut rng = Random::new(42);
        let mut state = EctopyState::Refractory(3);
        let (s1, f1) = step(state, 1.0, 1.0, &mut rng);
        assert!(!f1);
        assert_eq!(s1, EctopyState::Refractory(2));
        state = s1;
        let (s2, _) = step(state, 1.0, 1.0, &mut rng);
        assert_eq!(s2, EctopyState::Refractory(1));
        let (s3, f3) = step(s2, 0.0, 0.0, &mut rng);
        assert!(!f3);
        assert_eq!(s3, EctopyState::Normal);
    }

    #[test]
    fn test_no_long_runs_of_consecutive_ectopy() {
        // Even at pathological probabilities the machine cannot fire more
        // than twice in a row (base fire + one couplet).
        let mut rng = Random::new(7);
        let mut state = EctopyState::Normal;
        let mut consecutive = 0;
        let mut max_consecutive = 0;
        for _ in 0..2000 {
            let (next, fired) = step(state, 0.9, 0.9, &mut rng);
            if fired {
                consecutive += 1;
                max_consecutive = max_consecutive.max(consecutive);
            } else {
                consecutive = 0;
            }
            state = next;
        }
        assert!(max_consecutive <= 2, "saw {max_consecutive} in a row");
    }
}
