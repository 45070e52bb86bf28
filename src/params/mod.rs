//! Parameter resolution: (age, sex, diagnosis, seed) -> [`ParameterSet`].
//!
//! Resolution never fails. Ages outside the supported range are clamped,
//! unknown diagnosis keys resolve to "no modification", and every output
//! value is bounded to a physiologically plausible range.

mod anchors;
mod diagnosis;

pub use diagnosis::{
    known_keys, lookup, resolve_diagnosis, Diagnosis, EctopicKind, MorphologyPlan, RhythmClass,
    Side,
};

use crate::types::{Real, Seconds};
use crate::utils::{Random, Stage};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Patient sex, used for small anchor offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sex {
    /// Male anchor set (the reference tables' default).
    #[default]
    Male,
    /// Female anchor set.
    Female,
}

impl Sex {
    /// Single-letter label used in the record targets.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

/// Resolved synthesis parameters for one case.
///
/// Immutable once resolved; the later pipeline stages only read it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterSet {
    /// Target heart rate, bpm.
    pub hr_bpm: Real,
    /// PR interval, seconds.
    pub pr_s: Seconds,
    /// QRS duration, seconds.
    pub qrs_s: Seconds,
    /// QT interval, seconds (derived from QTc and rate, Bazett).
    pub qt_s: Seconds,
    /// Corrected QT, seconds.
    pub qtc_s: Seconds,
    /// P-wave axis, degrees in the frontal plane.
    pub p_axis_deg: Real,
    /// QRS axis, degrees.
    pub qrs_axis_deg: Real,
    /// T-wave axis, degrees.
    pub t_axis_deg: Real,
    /// Right-ventricular dominance weight, 0..=1.
    pub rv_dominance: Real,
    /// Juvenile T-wave (anterior inversion) weight, 0..=1.
    pub juvenile_t: Real,
    /// Septal activation depth: anterior tilt of early QRS forces.
    pub septal_depth: Real,
    /// Apical activation depth: inferior tilt of mid QRS forces.
    pub apical_depth: Real,
    /// Overall dipole voltage scale.
    pub voltage_scale: Real,
}

impl ParameterSet {
    fn clamp_to_bounds(&mut self) {
        self.hr_bpm = self.hr_bpm.clamp(30.0, 300.0);
        self.pr_s = self.pr_s.clamp(0.04, 0.40);
        self.qrs_s = self.qrs_s.clamp(0.03, 0.22);
        self.qtc_s = self.qtc_s.clamp(0.25, 0.60);
        self.p_axis_deg = self.p_axis_deg.clamp(-180.0, 180.0);
        self.qrs_axis_deg = self.qrs_axis_deg.clamp(-180.0, 180.0);
        self.t_axis_deg = self.t_axis_deg.clamp(-180.0, 180.0);
        self.rv_dominance = self.rv_dominance.clamp(0.0, 1.0);
        self.juvenile_t = self.juvenile_t.clamp(0.0, 1.0);
        self.voltage_scale = self.voltage_scale.clamp(0.2, 3.0);
    }

    /// Mean R-R interval implied by the target rate, seconds.
    #[must_use]
    pub fn rr_s(&self) -> Seconds {
        60.0 / self.hr_bpm
    }
}

/// Resolves the parameter set for one case.
///
/// Age is clamped to the supported range; `sex` defaults to the male anchor
/// set; unknown diagnosis keys apply no modification. Individual variation is
/// drawn from the case seed's parameter stream, so targets are seed-derived
/// and reproducible.
#[must_use]
pub fn resolve(age_years: Real, sex: Option<Sex>, dx: &str, seed: u64) -> ParameterSet {
    let mut rng = Random::for_stage(seed, Stage::Parameters);
    let age = age_years.clamp(0.0, 21.0);
    let sex = sex.unwrap_or_default();

    let mut p = ParameterSet {
        hr_bpm: anchors::interpolate(age, &anchors::HR_BPM),
        pr_s: anchors::interpolate(age, &anchors::PR_MS) / 1000.0,
        qrs_s: anchors::interpolate(age, &anchors::QRS_MS) / 1000.0,
        qt_s: 0.0,
        qtc_s: anchors::interpolate(age, &anchors::QTC_MS) / 1000.0,
        p_axis_deg: anchors::interpolate(age, &anchors::P_AXIS_DEG),
        qrs_axis_deg: anchors::interpolate(age, &anchors::QRS_AXIS_DEG),
        t_axis_deg: anchors::interpolate(age, &anchors::T_AXIS_DEG),
        rv_dominance: anchors::interpolate(age, &anchors::RV_DOMINANCE),
        juvenile_t: anchors::interpolate(age, &anchors::JUVENILE_T),
        septal_depth: anchors::interpolate(age, &anchors::SEPTAL_DEPTH),
        apical_depth: anchors::interpolate(age, &anchors::APICAL_DEPTH),
        voltage_scale: anchors::interpolate(age, &anchors::VOLTAGE_SCALE),
    };

    // Individual variation around the anchors, bounded to roughly the
    // 2nd-98th percentile band of the reference tables.
    p.hr_bpm = rng.bounded_normal(p.hr_bpm, p.hr_bpm * 0.025, p.hr_bpm * 0.85, p.hr_bpm * 1.15);
    p.pr_s = rng.bounded_normal(p.pr_s, p.pr_s * 0.02, p.pr_s * 0.85, p.pr_s * 1.15);
    p.qrs_s = rng.bounded_normal(p.qrs_s, p.qrs_s * 0.02, p.qrs_s * 0.85, p.qrs_s * 1.15);
    p.qtc_s = rng.bounded_normal(p.qtc_s, p.qtc_s * 0.015, p.qtc_s * 0.92, p.qtc_s * 1.08);
    p.qrs_axis_deg = rng.bounded_normal(p.qrs_axis_deg, 4.0, p.qrs_axis_deg - 12.0, p.qrs_axis_deg + 12.0);
    p.t_axis_deg = rng.bounded_normal(p.t_axis_deg, 3.0, p.t_axis_deg - 9.0, p.t_axis_deg + 9.0);

    (resolve_diagnosis(dx).params)(&mut p);

    if sex == Sex::Female {
        p.qtc_s += 0.004;
        p.qrs_s -= 0.003;
        p.voltage_scale *= 0.95;
    }

    p.clamp_to_bounds();

    // Bazett: QT = QTc * sqrt(RR).
    p.qt_s = (p.qtc_s * p.rr_s().sqrt()).clamp(0.12, 0.65);

    p
}
