//! The synthesis entry point: one call, one complete record.
//!
//! The five stages run strictly in order, each consuming the previous
//! stage's full output and its own ChaCha20 stream forked from the case
//! seed. A call either completes with a full [`EcgRecord`] or fails fast at
//! configuration validation; there are no partial results.

use std::collections::BTreeMap;

use crate::device::{
    inject_noise, AcquisitionChain, DeviceMode, NoiseLevel, NoisePlan,
};
use crate::error::Result;
use crate::forward::{derive_leads, heart_rotation, project};
use crate::params::{resolve, resolve_diagnosis, Sex};
use crate::rhythm::schedule;
use crate::source::{SourceContext, SourceKind, SourceModel};
use crate::types::{EcgRecord, Integrity, Real, Seconds, Targets, SCHEMA_VERSION};
use crate::utils::{Random, Stage};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable synthesis options beyond the case identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynthesisOptions {
    /// Record duration in seconds.
    pub duration_s: Seconds,
    /// Acquisition preset.
    pub device: DeviceMode,
    /// Artifact intensity.
    pub noise: NoiseLevel,
    /// Mains frequency for interference and the notch, Hz.
    pub mains_hz: Real,
    /// Source model implementation.
    pub source: SourceKind,
    /// Include the right-sided/posterior leads (V3R, V4R, V7).
    pub right_sided_leads: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            duration_s: 10.0,
            device: DeviceMode::default(),
            noise: NoiseLevel::default(),
            mains_hz: 60.0,
            source: SourceKind::default(),
            right_sided_leads: false,
        }
    }
}

/// One synthesis request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynthesisRequest {
    /// Patient age in years (clamped to the supported range).
    pub age_years: Real,
    /// Patient sex; `None` uses the male anchor tables.
    pub sex: Option<Sex>,
    /// Diagnosis key; unknown keys synthesize an unmodified sinus record.
    pub dx: String,
    /// Case seed. Identical requests are byte-identical in output.
    pub seed: u64,
    /// Synthesis options.
    pub options: SynthesisOptions,
}

/// Runs the full pipeline for one request.
///
/// # Errors
///
/// Returns [`crate::KardiaError::InvalidConfiguration`] when the requested
/// device output rate is structurally invalid (zero, above the internal
/// simulation rate, or not a divisor of it). Physiological inputs never
/// error.
pub fn synthesize(request: &SynthesisRequest) -> Result<EcgRecord> {
    let opts = &request.options;
    let duration_s = opts.duration_s.clamp(2.0, 120.0);

    // Fail fast on configuration before any stage runs.
    let chain = AcquisitionChain::new(opts.device.config(), opts.mains_hz)?;

    // Stage 1: parameter resolution.
    let params = resolve(request.age_years, request.sex, &request.dx, request.seed);
    let dx = resolve_diagnosis(&request.dx);

    // Stage 2: rhythm schedule.
    let mut rhythm_rng = Random::for_stage(request.seed, Stage::Rhythm);
    let sched = schedule(&params, dx, duration_s, &mut rhythm_rng);

    // Stage 3: source model.
    let ctx = SourceContext {
        schedule: &sched,
        params: &params,
        morphology: &dx.morphology,
        rhythm: dx.rhythm,
        duration_s,
    };
    let mut source_rng = Random::for_stage(request.seed, Stage::Source);
    let vcg = opts.source.build().render(&ctx, &mut source_rng);

    // Stage 4: forward projection and algebraic lead derivation.
    let mut forward_rng = Random::for_stage(request.seed, Stage::Forward);
    let rotation = heart_rotation(request.age_years.clamp(0.0, 21.0), &mut forward_rng);
    let mut potentials = project(&vcg, &rotation);
    drop(vcg);

    // Stage 5: artifacts in electrode space, then the acquisition chain.
    let mut device_rng = Random::for_stage(request.seed, Stage::Device);
    let noise_plan = NoisePlan {
        level: opts.noise,
        mains_hz: opts.mains_hz,
    };
    inject_noise(&mut potentials, &noise_plan, &mut device_rng);

    let leads = derive_leads(&potentials, opts.right_sided_leads);
    let leads_uv = chain.apply(&leads, request.age_years.clamp(0.0, 21.0));

    let integrity = measure_integrity(&leads_uv);
    let targets = build_targets(request, &params, &sched, opts);

    Ok(EcgRecord {
        schema_version: SCHEMA_VERSION.to_string(),
        fs: chain.output_fs(),
        duration_s,
        leads_uv,
        targets,
        integrity,
    })
}

fn build_targets(
    request: &SynthesisRequest,
    params: &crate::params::ParameterSet,
    sched: &crate::rhythm::Schedule,
    opts: &SynthesisOptions,
) -> Targets {
    let mut axes_deg = BTreeMap::new();
    axes_deg.insert("P".to_string(), params.p_axis_deg);
    axes_deg.insert("QRS".to_string(), params.qrs_axis_deg);
    axes_deg.insert("T".to_string(), params.t_axis_deg);

    Targets {
        synthetic: true,
        generator_version: crate::VERSION.to_string(),
        age_years: request.age_years,
        sex: request.sex.unwrap_or_default().label().to_string(),
        dx: request.dx.clone(),
        hr_bpm: params.hr_bpm,
        pr_ms: (params.pr_s * 1000.0).round() as i32,
        qrs_ms: (params.qrs_s * 1000.0).round() as i32,
        qt_ms: (params.qt_s * 1000.0).round() as i32,
        qtc_ms: (params.qtc_s * 1000.0).round() as i32,
        axes_deg,
        hrv: sched.hrv,
        device_mode: opts.device.label().to_string(),
        seed: request.seed,
    }
}

/// Measures the worst Einthoven and augmented-lead residuals on the final
/// integer leads, in microvolts.
fn measure_integrity(leads_uv: &BTreeMap<String, Vec<i16>>) -> Integrity {
    let get = |name: &str| leads_uv.get(name).map(Vec::as_slice);

    let einthoven = match (get("I"), get("II"), get("III")) {
        (Some(i), Some(ii), Some(iii)) => i
            .iter()
            .zip(ii)
            .zip(iii)
            .map(|((&a, &b), &c)| f64::from(i32::from(a) + i32::from(c) - i32::from(b)).abs())
            .fold(0.0, f64::max),
        _ => 0.0,
    };

    let augmented = match (get("aVR"), get("aVL"), get("aVF")) {
        (Some(r), Some(l), Some(f)) => r
            .iter()
            .zip(l)
            .zip(f)
            .map(|((&a, &b), &c)| f64::from(i32::from(a) + i32::from(b) + i32::from(c)).abs())
            .fold(0.0, f64::max),
        _ => 0.0,
    };

    Integrity {
        einthoven_max_residual_uv: einthoven,
        augmented_max_residual_uv: augmented,
    }
}
