//! Heart-rate-variability modulation.
//!
//! Beat intervals are perturbed by three sinusoidal components: a
//! respiratory-driven high-frequency term, a sympathetically mediated
//! low-frequency term and a very-low-frequency drift. Respiratory frequency
//! and all three amplitudes are age-dependent: infants breathe faster and
//! show the largest relative interval swings, with variability declining
//! toward adolescence.

use crate::types::{Hertz, Real, Seconds};
use crate::utils::Random;

/// One sinusoidal interval modulation component.
#[derive(Debug, Clone, Copy)]
struct Component {
    amplitude: Real,
    frequency: Hertz,
    phase: Real,
}

/// Age-parameterized three-band interval modulator.
#[derive(Debug, Clone)]
pub struct HrvModulator {
    components: [Component; 3],
    /// Standard deviation of per-interval white jitter, as a fraction of the
    /// base interval.
    jitter_frac: Real,
}

fn lerp_by_age(age_years: Real, at_birth: Real, at_adult: Real) -> Real {
    let f = (age_years / 16.0).clamp(0.0, 1.0);
    at_birth + f * (at_adult - at_birth)
}

impl HrvModulator {
    /// Builds the modulator for one case, drawing component phases from the
    /// rhythm stream.
    #[must_use]
    pub fn new(age_years: Real, rng: &mut Random) -> Self {
        // Respiratory rate ~45/min in neonates, ~15/min by adolescence.
        let resp_hz = lerp_by_age(age_years, 0.75, 0.25);
        let hf_amp = lerp_by_age(age_years, 0.055, 0.025);
        let lf_amp = lerp_by_age(age_years, 0.040, 0.022);
        let vlf_amp = lerp_by_age(age_years, 0.028, 0.015);

        Self {
            components: [
                Component {
                    amplitude: hf_amp,
                    frequency: resp_hz,
                    phase: rng.phase(),
                },
                Component {
                    amplitude: lf_amp,
                    frequency: 0.10,
                    phase: rng.phase(),
                },
                Component {
                    amplitude: vlf_amp,
                    frequency: 0.03,
                    phase: rng.phase(),
                },
            ],
            jitter_frac: 0.01,
        }
    }

    /// A modulator that applies no variability (tachyarrhythmia rhythms).
    #[must_use]
    pub fn suppressed() -> Self {
        Self {
            components: [Component {
                amplitude: 0.0,
                frequency: 1.0,
                phase: 0.0,
            }; 3],
            jitter_frac: 0.002,
        }
    }

    /// Multiplicative interval factor at time `t`.
    #[must_use]
    pub fn factor(&self, t: Seconds) -> Real {
        let mut f = 1.0;
        for c in &self.components {
            f += c.amplitude * (std::f64::consts::TAU * c.frequency * t + c.phase).sin();
        }
        f
    }

    /// Respiratory phase at time `t`, for amplitude modulation in the source
    /// model. Returns radians in `[0, 2π)`.
    #[must_use]
    pub fn respiratory_phase(&self, t: Seconds) -> Real {
        let c = &self.components[0];
        (std::f64::consts::TAU * c.frequency * t + c.phase) % std::f64::consts::TAU
    }

    /// Draws the white jitter term for one interval, seconds.
    pub fn draw_jitter(&self, base_rr: Seconds, rng: &mut Random) -> Seconds {
        rng.normal(0.0, self.jitter_frac * base_rr)
    }

    /// Respiratory frequency of this case, Hz.
    #[must_use]
    pub fn respiratory_hz(&self) -> Hertz {
        self.components[0].frequency
    }
}
