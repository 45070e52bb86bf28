//! Parametric pulse basis for the morphology model.
//!
//! Every wave the source model emits is a superposition of these closed-form
//! shapes evaluated per sample. All functions return a neutral 0.0 for
//! zero or negative widths instead of dividing by zero.

use crate::types::{Real, Seconds};

/// Symmetric Gaussian pulse centered at `center` with width (standard
/// deviation) `width`.
#[must_use]
pub fn gaussian(t: Seconds, center: Seconds, width: Seconds) -> Real {
    if width <= 0.0 {
        return 0.0;
    }
    let u = (t - center) / width;
    (-0.5 * u * u).exp()
}

/// Asymmetric Gaussian: independent rise and decay widths.
#[must_use]
pub fn asym_gaussian(t: Seconds, center: Seconds, rise: Seconds, decay: Seconds) -> Real {
    let width = if t < center { rise } else { decay };
    gaussian(t, center, width)
}

/// Generalized Gaussian with tunable peakedness exponent.
///
/// `power = 2` recovers the ordinary Gaussian; larger exponents flatten the
/// peak toward a plateau, smaller ones sharpen it.
#[must_use]
pub fn gen_gaussian(t: Seconds, center: Seconds, width: Seconds, power: Real) -> Real {
    if width <= 0.0 || power <= 0.0 {
        return 0.0;
    }
    let u = ((t - center) / width).abs();
    (-0.5 * u.powf(power)).exp()
}

/// Physicists' Hermite polynomial of order `n` (0..=4).
#[must_use]
pub fn hermite(n: usize, x: Real) -> Real {
    match n {
        0 => 1.0,
        1 => 2.0 * x,
        2 => 4.0 * x * x - 2.0,
        3 => 8.0 * x * x * x - 12.0 * x,
        _ => 16.0 * x * x * x * x - 48.0 * x * x + 12.0,
    }
}

/// Truncated Hermite-function expansion: Σ cₖ Hₖ(u) exp(-u²/2).
///
/// Orders above 0 put ripples on the envelope, which is how notches and
/// slurs in wide complexes are encoded.
#[must_use]
pub fn hermite_sum(t: Seconds, center: Seconds, width: Seconds, coeffs: &[Real]) -> Real {
    if width <= 0.0 {
        return 0.0;
    }
    let u = (t - center) / width;
    let envelope = (-0.5 * u * u).exp();
    coeffs
        .iter()
        .take(5)
        .enumerate()
        .map(|(k, &c)| c * hermite(k, u))
        .sum::<Real>()
        * envelope
}

/// Smooth plateau built from two logistic edges: rises over `rise` seconds
/// at `onset`, holds for `hold`, falls over `fall`.
///
/// Used for ST-segment elevation and PR-segment depression shelves.
#[must_use]
pub fn sigmoid_plateau(
    t: Seconds,
    onset: Seconds,
    rise: Seconds,
    hold: Seconds,
    fall: Seconds,
) -> Real {
    if rise <= 0.0 || fall <= 0.0 {
        return 0.0;
    }
    let up = 1.0 / (1.0 + (-(t - onset) / (rise * 0.25)).exp());
    let down = 1.0 / (1.0 + (-(t - (onset + rise + hold + fall)) / (fall * 0.25)).exp());
    up - down
}

/// Asymmetric sawtooth oscillation in `[-1, 1]` with skew in `(0, 1)`.
///
/// Skew is the fraction of the period spent on the rising edge; flutter
/// waves use a slow rise and a fast fall.
#[must_use]
pub fn sawtooth(t: Seconds, frequency: Real, skew: Real) -> Real {
    if frequency <= 0.0 {
        return 0.0;
    }
    let phase = (t * frequency).fract();
    let skew = skew.clamp(0.05, 0.95);
    if phase < skew {
        -1.0 + 2.0 * phase / skew
    } else {
        1.0 - 2.0 * (phase - skew) / (1.0 - skew)
    }
}
