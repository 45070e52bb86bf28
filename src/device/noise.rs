//! Electrode-domain artifact synthesis.
//!
//! All artifacts are injected into the electrode potentials *before* lead
//! derivation. Because the leads are algebraic combinations of electrodes,
//! every artifact stays consistent across derived leads and the limb-lead
//! identities survive arbitrary noise.
//!
//! Five sources are modeled: colored baseline wander, mains interference
//! with harmonics under slow amplitude modulation, band-limited
//! nonstationary EMG, transient electrode motion with bi-exponential
//! recovery, and slow impedance drift with occasional step changes. Each
//! source combines a shared component with electrode-specific weights.

use crate::types::{Electrode, ElectrodePotentials, Hertz, Millivolts, Real, Seconds, SIM_FS};
use crate::utils::Random;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Overall artifact intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoiseLevel {
    /// No artifacts at all (clean physics-test configuration).
    Off,
    /// Light artifact load.
    Low,
    /// Realistic resting acquisition.
    #[default]
    Typical,
    /// Restless-patient acquisition.
    Noisy,
}

impl NoiseLevel {
    fn scale(self) -> Real {
        match self {
            NoiseLevel::Off => 0.0,
            NoiseLevel::Low => 0.5,
            NoiseLevel::Typical => 1.0,
            NoiseLevel::Noisy => 2.2,
        }
    }
}

/// Artifact configuration for one synthesis call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoisePlan {
    /// Intensity preset.
    pub level: NoiseLevel,
    /// Mains frequency (50 or 60 Hz regions).
    pub mains_hz: Hertz,
}

impl Default for NoisePlan {
    fn default() -> Self {
        Self {
            level: NoiseLevel::default(),
            mains_hz: 60.0,
        }
    }
}

/// Adds all artifact sources onto the electrode potentials.
pub fn inject(potentials: &mut ElectrodePotentials, plan: &NoisePlan, rng: &mut Random) {
    let scale = plan.level.scale();
    if scale <= 0.0 {
        return;
    }
    let n = potentials.len();
    if n == 0 {
        return;
    }

    let wander = baseline_wander(n, scale, rng);
    let mains = mains_interference(n, plan.mains_hz, scale, rng);
    let emg = emg_noise(n, scale, rng);
    let motion = motion_events(n, scale, rng);
    let drift = DriftSpec::draw(n, scale, rng);

    for e in Electrode::ALL {
        // Shared-component coupling weight per electrode plus a small
        // independent wander so electrodes decorrelate realistically.
        let w_wander = rng.uniform_range(0.7, 1.3);
        let w_mains = rng.uniform_range(0.6, 1.4);
        let w_emg = emg_weight(e) * rng.uniform_range(0.7, 1.3);
        let own_wander = baseline_wander(n, 0.35 * scale, rng);
        let own_drift = DriftSpec::draw(n, 0.6 * scale, rng);

        let trace = potentials.get_mut(e);
        for i in 0..n {
            trace[i] += w_wander * wander[i]
                + own_wander[i]
                + w_mains * mains[i]
                + w_emg * emg[i]
                + drift.eval(i)
                + own_drift.eval(i);
        }
    }

    // Motion transients hit one electrode hard and couple weakly into the
    // rest.
    for event in motion {
        let victim = Electrode::ALL[rng.index(Electrode::ALL.len())];
        for e in Electrode::ALL {
            let coupling = if e == victim { 1.0 } else { 0.12 };
            let trace = potentials.get_mut(e);
            event.add_to(trace, coupling);
        }
    }
}

/// 1/f-weighted sum of sinusoids between 0.05 and 0.5 Hz.
fn baseline_wander(n: usize, scale: Real, rng: &mut Random) -> Vec<Millivolts> {
    let freqs = [0.05, 0.09, 0.15, 0.22, 0.33, 0.48];
    let comps: Vec<(Real, Real, Real)> = freqs
        .iter()
        .map(|&f| {
            let amp = 0.045 * scale * (0.05 / f);
            (amp * rng.jitter(0.3), f, rng.phase())
        })
        .collect();

    let dt = 1.0 / f64::from(SIM_FS);
    (0..n)
        .map(|i| {
            let t = i as Real * dt;
            comps
                .iter()
                .map(|&(a, f, p)| a * (std::f64::consts::TAU * f * t + p).sin())
                .sum()
        })
        .collect()
}

/// Mains fundamental plus two harmonics under slow amplitude modulation.
fn mains_interference(n: usize, mains_hz: Hertz, scale: Real, rng: &mut Random) -> Vec<Millivolts> {
    let base_amp = 0.008 * scale;
    let harmonics = [
        (base_amp, mains_hz, rng.phase()),
        (base_amp * 0.30, 2.0 * mains_hz, rng.phase()),
        (base_amp * 0.12, 3.0 * mains_hz, rng.phase()),
    ];
    let am_freq = rng.uniform_range(0.05, 0.20);
    let am_phase = rng.phase();

    let dt = 1.0 / f64::from(SIM_FS);
    (0..n)
        .map(|i| {
            let t = i as Real * dt;
            let am = 1.0 + 0.4 * (std::f64::consts::TAU * am_freq * t + am_phase).sin();
            am * harmonics
                .iter()
                .map(|&(a, f, p)| a * (std::f64::consts::TAU * f * t + p).sin())
                .sum::<Real>()
        })
        .collect()
}

/// Muscle noise: an 8-sinusoid carrier in the 25-95 Hz band under a
/// multi-frequency positive envelope, nonstationary by construction.
fn emg_noise(n: usize, scale: Real, rng: &mut Random) -> Vec<Millivolts> {
    let carriers: Vec<(Real, Real)> = (0..8)
        .map(|_| (rng.uniform_range(25.0, 95.0), rng.phase()))
        .collect();
    let envelopes: Vec<(Real, Real)> = (0..3)
        .map(|_| (rng.uniform_range(0.15, 0.9), rng.phase()))
        .collect();
    let amp = 0.006 * scale;

    let dt = 1.0 / f64::from(SIM_FS);
    (0..n)
        .map(|i| {
            let t = i as Real * dt;
            let envelope: Real = envelopes
                .iter()
                .map(|&(f, p)| (std::f64::consts::TAU * f * t + p).sin())
                .sum::<Real>()
                / 3.0;
            let envelope = (0.55 + 0.45 * envelope).max(0.0);
            let carrier: Real = carriers
                .iter()
                .map(|&(f, p)| (std::f64::consts::TAU * f * t + p).sin())
                .sum::<Real>()
                / (carriers.len() as Real).sqrt();
            amp * envelope * carrier
        })
        .collect()
}

/// One transient electrode-motion artifact.
struct MotionEvent {
    onset: usize,
    amplitude: Millivolts,
    tau_fast: Seconds,
    tau_slow: Seconds,
}

impl MotionEvent {
    fn add_to(&self, trace: &mut [Millivolts], coupling: Real) {
        let dt = 1.0 / f64::from(SIM_FS);
        // Bi-exponential recovery: sharp edge, fast settle, slow tail.
        let span = ((6.0 * self.tau_slow) / dt) as usize;
        let end = (self.onset + span).min(trace.len());
        for i in self.onset..end {
            let t = (i - self.onset) as Real * dt;
            let v = self.amplitude * ((-t / self.tau_slow).exp() - (-t / self.tau_fast).exp());
            trace[i] += coupling * v;
        }
    }
}

/// Draws the motion events for one record (Poisson-ish schedule).
fn motion_events(n: usize, scale: Real, rng: &mut Random) -> Vec<MotionEvent> {
    let duration = n as Real / f64::from(SIM_FS);
    let rate_per_s = 0.035 * scale;
    let expected = duration * rate_per_s;
    let count = (expected.floor() as usize) + usize::from(rng.chance(expected.fract()));

    (0..count)
        .map(|_| MotionEvent {
            onset: rng.index(n),
            amplitude: rng.uniform_range(0.15, 0.55)
                * scale
                * if rng.chance(0.5) { 1.0 } else { -1.0 },
            tau_fast: rng.uniform_range(0.02, 0.06),
            tau_slow: rng.uniform_range(0.35, 0.90),
        })
        .collect()
}

/// Slow linear impedance drift with an optional mid-record step.
struct DriftSpec {
    slope_per_sample: Millivolts,
    step_at: Option<usize>,
    step_amp: Millivolts,
}

impl DriftSpec {
    fn draw(n: usize, scale: Real, rng: &mut Random) -> Self {
        let total = rng.normal(0.0, 0.015) * scale;
        let step_at = if rng.chance(0.25 * scale.min(1.0)) {
            Some(rng.index(n))
        } else {
            None
        };
        Self {
            slope_per_sample: total / n.max(1) as Real,
            step_at,
            step_amp: rng.uniform_range(-0.04, 0.04) * scale,
        }
    }

    fn eval(&self, i: usize) -> Millivolts {
        let mut v = self.slope_per_sample * i as Real;
        if let Some(at) = self.step_at {
            if i >= at {
                v += self.step_amp;
            }
        }
        v
    }
}

/// Relative EMG pickup per electrode: limb electrodes sit over muscle,
/// precordials less so.
fn emg_weight(e: Electrode) -> Real {
    match e {
        Electrode::Ra | Electrode::La => 1.0,
        Electrode::Ll => 0.8,
        Electrode::V1 | Electrode::V2 | Electrode::V3r | Electrode::V4r => 0.35,
        Electrode::V3 | Electrode::V4 | Electrode::V7 => 0.30,
        Electrode::V5 | Electrode::V6 => 0.40,
    }
}
