//! Cross-lead physics invariants and output-format safety.
//!
//! Run with: `cargo test --test physics`

use kardia::device::DeviceMode;
use kardia::prelude::*;

fn clean_request(dx: &str, seed: u64) -> SynthesisRequest {
    SynthesisRequest {
        age_years: 8.0,
        sex: None,
        dx: dx.to_string(),
        seed,
        options: SynthesisOptions {
            noise: NoiseLevel::Off,
            ..SynthesisOptions::default()
        },
    }
}

fn einthoven_residual_uv(rec: &EcgRecord) -> f64 {
    let i = &rec.leads_uv["I"];
    let ii = &rec.leads_uv["II"];
    let iii = &rec.leads_uv["III"];
    i.iter()
        .zip(ii)
        .zip(iii)
        .map(|((&a, &b), &c)| f64::from(i32::from(a) + i32::from(c) - i32::from(b)).abs())
        .fold(0.0, f64::max)
}

#[test]
fn einthoven_noise_free_within_two_microvolts() {
    for seed in [1, 12345, 777] {
        let rec = synthesize(&clean_request("Normal sinus", seed)).unwrap();
        let residual = einthoven_residual_uv(&rec);
        assert!(residual <= 2.0, "seed {seed}: residual {residual} uV");
        assert!(rec.integrity.einthoven_max_residual_uv <= 2.0);
    }
}

#[test]
fn einthoven_stays_bounded_with_noise() {
    let mut req = clean_request("Normal sinus", 12345);
    req.options.noise = NoiseLevel::Noisy;
    let rec = synthesize(&req).unwrap();
    // Noise is injected per electrode, so the residual is still only
    // quantization error.
    assert!(
        rec.integrity.einthoven_max_residual_uv <= 4.0,
        "residual {}",
        rec.integrity.einthoven_max_residual_uv
    );
}

#[test]
fn augmented_leads_sum_to_zero() {
    let rec = synthesize(&clean_request("LVH", 42)).unwrap();
    assert!(
        rec.integrity.augmented_max_residual_uv <= 3.0,
        "residual {}",
        rec.integrity.augmented_max_residual_uv
    );
}

#[test]
fn all_leads_share_one_length() {
    let mut req = clean_request("Normal sinus", 3);
    req.options.right_sided_leads = true;
    let rec = synthesize(&req).unwrap();
    let n = rec.n_samples();
    assert!(n > 0);
    for (name, lead) in &rec.leads_uv {
        assert_eq!(lead.len(), n, "{name}");
    }
}

#[test]
fn downsampling_presets_give_floor_duration_times_rate() {
    for (mode, fs) in [
        (DeviceMode::Diagnostic, 500),
        (DeviceMode::Monitor, 250),
        (DeviceMode::Exercise, 250),
        (DeviceMode::Holter, 125),
        (DeviceMode::HighResolution, 1000),
    ] {
        let mut req = clean_request("Normal sinus", 8);
        req.options.device = mode;
        req.options.duration_s = 7.0;
        let rec = synthesize(&req).unwrap();
        assert_eq!(rec.fs, fs);
        assert_eq!(rec.n_samples(), 7 * fs as usize, "{mode:?}");
    }
}

#[test]
fn amplitudes_always_representable() {
    // Crank every amplitude lever at once; samples must saturate, never
    // wrap, and stay within the i16 domain by construction.
    let req = SynthesisRequest {
        age_years: 0.1,
        sex: None,
        dx: "LVH".to_string(),
        seed: 31,
        options: SynthesisOptions {
            device: DeviceMode::HighResolution,
            noise: NoiseLevel::Noisy,
            ..SynthesisOptions::default()
        },
    };
    let rec = synthesize(&req).unwrap();
    for (name, lead) in &rec.leads_uv {
        let max = lead.iter().map(|&v| i32::from(v).abs()).max().unwrap();
        assert!(max <= i32::from(i16::MAX), "{name} exceeded i16");
        // A plausible ECG also never sits near the rail for its whole span.
        let railed = lead
            .iter()
            .filter(|&&v| i32::from(v).abs() >= 32_000)
            .count();
        assert!(railed < lead.len() / 10, "{name} pinned at the rail");
    }
}

#[test]
fn signal_has_physiologic_scale() {
    let rec = synthesize(&clean_request("Normal sinus", 12345)).unwrap();
    let ii = &rec.leads_uv["II"];
    let peak = ii.iter().map(|&v| i32::from(v).abs()).max().unwrap();
    // R waves in lead II land in the hundreds-of-microvolts to few-mV band.
    assert!(peak > 200, "peak only {peak} uV");
    assert!(peak < 5000, "peak {peak} uV implausible");
}

#[test]
fn metadata_reflects_request() {
    let rec = synthesize(&clean_request("Normal sinus", 12345)).unwrap();
    assert!(rec.targets.synthetic);
    assert_eq!(rec.targets.seed, 12345);
    assert_eq!(rec.targets.dx, "Normal sinus");
    assert_eq!(rec.targets.device_mode, "diagnostic");
    assert!(rec.targets.hrv.n_beats > 5);
    assert!(rec.targets.axes_deg.contains_key("QRS"));
}
