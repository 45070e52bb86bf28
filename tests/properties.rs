//! Property-based invariants over the basis toolkit, sampling helpers and
//! resolver.
//!
//! Run with: `cargo test --test properties`

use kardia::params::resolve;
use kardia::source::{gaussian, gen_gaussian, hermite_sum, sawtooth};
use kardia::utils::Random;
use proptest::prelude::*;

proptest! {
    #[test]
    fn gaussian_bounded_and_neutral_on_bad_width(
        t in -10.0f64..10.0,
        center in -10.0f64..10.0,
        width in -1.0f64..1.0,
    ) {
        let v = gaussian(t, center, width);
        prop_assert!((0.0..=1.0).contains(&v));
        if width <= 0.0 {
            prop_assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn gen_gaussian_bounded(
        t in -5.0f64..5.0,
        width in 0.001f64..1.0,
        power in 0.5f64..8.0,
    ) {
        let v = gen_gaussian(t, 0.0, width, power);
        prop_assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn hermite_sum_is_finite(
        t in -5.0f64..5.0,
        width in 0.001f64..0.5,
        c0 in -2.0f64..2.0,
        c3 in -2.0f64..2.0,
    ) {
        let v = hermite_sum(t, 0.0, width, &[c0, 0.0, 0.0, c3, 0.0]);
        prop_assert!(v.is_finite());
    }

    #[test]
    fn sawtooth_stays_in_unit_band(
        t in 0.0f64..100.0,
        freq in 0.1f64..400.0,
        skew in 0.0f64..1.0,
    ) {
        let v = sawtooth(t, freq, skew);
        prop_assert!((-1.0..=1.0).contains(&v));
    }

    #[test]
    fn bounded_normal_honors_bounds(
        seed in any::<u64>(),
        mean in -50.0f64..50.0,
        sd in 0.0f64..30.0,
    ) {
        let mut rng = Random::new(seed);
        let lo = mean - 1.0;
        let hi = mean + 2.0;
        for _ in 0..16 {
            let v = rng.bounded_normal(mean, sd, lo, hi);
            prop_assert!(v >= lo && v <= hi);
        }
    }

    #[test]
    fn resolver_never_leaves_physiologic_bounds(
        age in -10.0f64..200.0,
        seed in any::<u64>(),
    ) {
        let p = resolve(age, None, "Normal sinus", seed);
        prop_assert!(p.hr_bpm >= 30.0 && p.hr_bpm <= 300.0);
        prop_assert!(p.pr_s >= 0.04 && p.pr_s <= 0.40);
        prop_assert!(p.qrs_s >= 0.03 && p.qrs_s <= 0.22);
        prop_assert!(p.qtc_s >= 0.25 && p.qtc_s <= 0.60);
        prop_assert!(p.qt_s > 0.0 && p.qt_s < 0.70);
        prop_assert!(p.rv_dominance >= 0.0 && p.rv_dominance <= 1.0);
    }

    #[test]
    fn resolver_deterministic_for_any_input(
        age in 0.0f64..21.0,
        seed in any::<u64>(),
    ) {
        let a = resolve(age, None, "RBBB", seed);
        let b = resolve(age, None, "RBBB", seed);
        prop_assert_eq!(a, b);
    }
}
