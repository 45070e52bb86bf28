//! The diagnosis registry.
//!
//! Each supported diagnosis is one table entry bundling its rhythm class, a
//! parameter transform and a morphology plan. The synthesis pipeline only
//! ever dispatches through this table; there is no string comparison outside
//! [`lookup`]. Unknown keys resolve to the normal-sinus entry, i.e. "no
//! modification"; hosts that want strict behavior
//! can call [`lookup`] themselves first.

use crate::params::ParameterSet;
use crate::types::Real;

/// Which bundle branch or ventricle a morphology change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left-sided pattern.
    Left,
    /// Right-sided pattern.
    Right,
}

/// Kind of premature beat produced by an ectopy rhythm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EctopicKind {
    /// Premature atrial contraction.
    Atrial,
    /// Premature ventricular contraction.
    Ventricular,
}

/// Rhythm class driving the scheduler's dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RhythmClass {
    /// Every atrial event conducts at a fixed PR offset.
    Sinus,
    /// Fixed-ratio AV block: one conducted beat per `p_per_qrs` P waves.
    FixedRatioBlock {
        /// P waves per conducted QRS (2 = 2:1 block).
        p_per_qrs: u32,
    },
    /// Progressive PR prolongation over `cycle` beats, then one dropped beat.
    Wenckebach {
        /// Conducted beats per Wenckebach cycle before the drop.
        cycle: u32,
    },
    /// Complete AV dissociation with an independent ventricular escape.
    CompleteDissociation {
        /// Escape rate of the ventricular pacemaker, bpm.
        ventricular_rate_bpm: Real,
    },
    /// Sinus rhythm with randomly interspersed premature beats.
    Ectopy {
        /// Atrial or ventricular premature beats.
        kind: EctopicKind,
        /// Per-beat probability of an ectopic event.
        base_prob: Real,
        /// Elevated probability immediately after an ectopic beat.
        cluster_prob: Real,
    },
    /// Macro-reentrant atrial flutter with fixed-ratio conduction.
    Flutter {
        /// Atrial (flutter wave) rate, bpm.
        atrial_rate_bpm: Real,
        /// Flutter waves per conducted QRS.
        conduction_ratio: u32,
    },
    /// Regular tachyarrhythmia driven by rate alone; HRV suppressed.
    RateOnly {
        /// Whether discrete P waves are hidden (buried in T).
        suppress_p: bool,
    },
}

/// Morphology switches and weights consumed by the source model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphologyPlan {
    /// Bundle-branch conduction delay pattern.
    pub bundle_branch: Option<Side>,
    /// Pre-excitation delta wave (slurred QRS upstroke).
    pub delta_wave: bool,
    /// Diffuse ST plateau elevation, mV.
    pub st_elevation_mv: Real,
    /// PR-segment depression, mV (pericarditis).
    pub pr_depression_mv: Real,
    /// Ventricular hypertrophy pattern.
    pub hypertrophy: Option<Side>,
    /// Continuous sawtooth flutter waves in the atrial direction.
    pub flutter_wave: bool,
    /// Suppress discrete P waves regardless of schedule.
    pub suppress_p: bool,
    /// Additional T-axis reversal weight (0 = none, 1 = full inversion).
    pub t_inversion_weight: Real,
}

impl MorphologyPlan {
    /// Plan with every modifier disabled.
    pub const NONE: MorphologyPlan = MorphologyPlan {
        bundle_branch: None,
        delta_wave: false,
        st_elevation_mv: 0.0,
        pr_depression_mv: 0.0,
        hypertrophy: None,
        flutter_wave: false,
        suppress_p: false,
        t_inversion_weight: 0.0,
    };
}

impl Default for MorphologyPlan {
    fn default() -> Self {
        Self::NONE
    }
}

/// One registered diagnosis.
pub struct Diagnosis {
    /// Registry key and display label.
    pub key: &'static str,
    /// Rhythm class for the scheduler.
    pub rhythm: RhythmClass,
    /// Parameter transform applied after anchor interpolation.
    pub params: fn(&mut ParameterSet),
    /// Morphology switches for the source model.
    pub morphology: MorphologyPlan,
}

fn params_identity(_p: &mut ParameterSet) {}

fn params_bradycardia(p: &mut ParameterSet) {
    p.hr_bpm = (p.hr_bpm * 0.60).max(40.0);
}

fn params_tachycardia(p: &mut ParameterSet) {
    p.hr_bpm = (p.hr_bpm * 1.45).min(230.0);
}

fn params_first_degree_avb(p: &mut ParameterSet) {
    p.pr_s = (p.pr_s + 0.09).max(0.21);
}

fn params_wenckebach(p: &mut ParameterSet) {
    p.pr_s = (p.pr_s + 0.04).max(0.16);
}

fn params_complete_avb(p: &mut ParameterSet) {
    // Atrial rate stays sinus; the ventricular escape rate lives in the
    // rhythm class. Escape complexes are modestly widened.
    p.qrs_s = (p.qrs_s * 1.4).max(0.11);
}

fn params_wpw(p: &mut ParameterSet) {
    p.pr_s = p.pr_s.clamp(0.085, 0.115);
    p.qrs_s = (p.qrs_s + 0.045).max(0.11);
}

fn params_rbbb(p: &mut ParameterSet) {
    p.qrs_s = (p.qrs_s + 0.055).max(0.125);
    p.qrs_axis_deg += 25.0;
}

fn params_lbbb(p: &mut ParameterSet) {
    p.qrs_s = (p.qrs_s + 0.070).max(0.145);
    p.qrs_axis_deg -= 30.0;
}

fn params_lvh(p: &mut ParameterSet) {
    p.voltage_scale *= 1.5;
    p.qrs_axis_deg -= 20.0;
}

fn params_rvh(p: &mut ParameterSet) {
    p.voltage_scale *= 1.25;
    p.qrs_axis_deg += 45.0;
    p.rv_dominance = (p.rv_dominance + 0.6).min(1.0);
}

fn params_lafb(p: &mut ParameterSet) {
    p.qrs_axis_deg = -55.0;
    p.qrs_s += 0.01;
}

fn params_long_qt(p: &mut ParameterSet) {
    p.qtc_s = (p.qtc_s + 0.08).max(0.48);
}

fn params_flutter(p: &mut ParameterSet) {
    // Ventricular response set by conduction ratio of the ~300 bpm circuit.
    p.hr_bpm = 150.0;
}

fn params_svt(p: &mut ParameterSet) {
    p.hr_bpm = 220.0;
    p.pr_s = 0.08;
}

fn params_pericarditis(p: &mut ParameterSet) {
    p.hr_bpm *= 1.10;
}

/// The fixed diagnosis table.
///
/// Rhythm probabilities and rates here are case-independent; everything
/// case-specific is drawn by the scheduler from its own stream.
static REGISTRY: &[Diagnosis] = &[
    Diagnosis {
        key: "Normal sinus",
        rhythm: RhythmClass::Sinus,
        params: params_identity,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "Sinus bradycardia",
        rhythm: RhythmClass::Sinus,
        params: params_bradycardia,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "Sinus tachycardia",
        rhythm: RhythmClass::Sinus,
        params: params_tachycardia,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "1st degree AVB",
        rhythm: RhythmClass::Sinus,
        params: params_first_degree_avb,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "2nd degree AVB (Mobitz I)",
        rhythm: RhythmClass::Wenckebach { cycle: 4 },
        params: params_wenckebach,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "2nd degree AVB (Mobitz II)",
        rhythm: RhythmClass::FixedRatioBlock { p_per_qrs: 3 },
        params: params_identity,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "2:1 AVB",
        rhythm: RhythmClass::FixedRatioBlock { p_per_qrs: 2 },
        params: params_identity,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "3rd degree AVB",
        rhythm: RhythmClass::CompleteDissociation {
            ventricular_rate_bpm: 45.0,
        },
        params: params_complete_avb,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "WPW",
        rhythm: RhythmClass::Sinus,
        params: params_wpw,
        morphology: MorphologyPlan {
            delta_wave: true,
            ..MorphologyPlan::NONE
        },
    },
    Diagnosis {
        key: "RBBB",
        rhythm: RhythmClass::Sinus,
        params: params_rbbb,
        morphology: MorphologyPlan {
            bundle_branch: Some(Side::Right),
            ..MorphologyPlan::NONE
        },
    },
    Diagnosis {
        key: "LBBB",
        rhythm: RhythmClass::Sinus,
        params: params_lbbb,
        morphology: MorphologyPlan {
            bundle_branch: Some(Side::Left),
            ..MorphologyPlan::NONE
        },
    },
    Diagnosis {
        key: "LVH",
        rhythm: RhythmClass::Sinus,
        params: params_lvh,
        morphology: MorphologyPlan {
            hypertrophy: Some(Side::Left),
            t_inversion_weight: 0.3,
            ..MorphologyPlan::NONE
        },
    },
    Diagnosis {
        key: "RVH",
        rhythm: RhythmClass::Sinus,
        params: params_rvh,
        morphology: MorphologyPlan {
            hypertrophy: Some(Side::Right),
            ..MorphologyPlan::NONE
        },
    },
    Diagnosis {
        key: "LAFB",
        rhythm: RhythmClass::Sinus,
        params: params_lafb,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "Long QT",
        rhythm: RhythmClass::Sinus,
        params: params_long_qt,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "PACs",
        rhythm: RhythmClass::Ectopy {
            kind: EctopicKind::Atrial,
            base_prob: 0.10,
            cluster_prob: 0.30,
        },
        params: params_identity,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "PVCs",
        rhythm: RhythmClass::Ectopy {
            kind: EctopicKind::Ventricular,
            base_prob: 0.08,
            cluster_prob: 0.25,
        },
        params: params_identity,
        morphology: MorphologyPlan::NONE,
    },
    Diagnosis {
        key: "Atrial flutter",
        rhythm: RhythmClass::Flutter {
            atrial_rate_bpm: 300.0,
            conduction_ratio: 2,
        },
        params: params_flutter,
        morphology: MorphologyPlan {
            flutter_wave: true,
            suppress_p: true,
            ..MorphologyPlan::NONE
        },
    },
    Diagnosis {
        key: "SVT (narrow)",
        rhythm: RhythmClass::RateOnly { suppress_p: true },
        params: params_svt,
        morphology: MorphologyPlan {
            suppress_p: true,
            ..MorphologyPlan::NONE
        },
    },
    Diagnosis {
        key: "Pericarditis",
        rhythm: RhythmClass::Sinus,
        params: params_pericarditis,
        morphology: MorphologyPlan {
            st_elevation_mv: 0.15,
            pr_depression_mv: 0.06,
            ..MorphologyPlan::NONE
        },
    },
];

/// Looks up a diagnosis by its exact key.
#[must_use]
pub fn lookup(key: &str) -> Option<&'static Diagnosis> {
    REGISTRY.iter().find(|d| d.key == key)
}

/// Resolves a diagnosis key, falling back to `"Normal sinus"` for unknown
/// keys.
#[must_use]
pub fn resolve_diagnosis(key: &str) -> &'static Diagnosis {
    lookup(key).unwrap_or(&REGISTRY[0])
}

/// All registered diagnosis keys.
#[must_use]
pub fn known_keys() -> Vec<&'static str> {
    REGISTRY.iter().map(|d| d.key).collect()
}
