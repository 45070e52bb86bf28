//! Diagnosis contracts and end-to-end scenarios.
//!
//! Run with: `cargo test --test diagnoses`

use kardia::params::resolve;
use kardia::prelude::*;

fn clean_request(age: f64, dx: &str, seed: u64) -> SynthesisRequest {
    SynthesisRequest {
        age_years: age,
        sex: None,
        dx: dx.to_string(),
        seed,
        options: SynthesisOptions {
            noise: NoiseLevel::Off,
            ..SynthesisOptions::default()
        },
    }
}

#[test]
fn wpw_short_pr_wide_qrs() {
    for seed in 0..10 {
        let rec = synthesize(&clean_request(8.0, "WPW", seed)).unwrap();
        assert!(
            (80..=120).contains(&rec.targets.pr_ms),
            "seed {seed}: PR {} ms",
            rec.targets.pr_ms
        );
        assert!(rec.targets.qrs_ms >= 105, "seed {seed}: QRS {}", rec.targets.qrs_ms);
    }
}

#[test]
fn first_degree_avb_long_pr() {
    for seed in 0..10 {
        let rec = synthesize(&clean_request(10.0, "1st degree AVB", seed)).unwrap();
        assert!(rec.targets.pr_ms > 200, "seed {seed}: PR {}", rec.targets.pr_ms);
    }
}

#[test]
fn bundle_branch_blocks_widen_qrs() {
    for seed in 0..10 {
        let rbbb = synthesize(&clean_request(12.0, "RBBB", seed)).unwrap();
        assert!(rbbb.targets.qrs_ms >= 120, "RBBB QRS {}", rbbb.targets.qrs_ms);

        let lbbb = synthesize(&clean_request(12.0, "LBBB", seed)).unwrap();
        assert!(lbbb.targets.qrs_ms >= 140, "LBBB QRS {}", lbbb.targets.qrs_ms);
    }
}

#[test]
fn long_qt_prolongs_qtc() {
    let rec = synthesize(&clean_request(9.0, "Long QT", 4)).unwrap();
    assert!(rec.targets.qtc_ms >= 470, "QTc {}", rec.targets.qtc_ms);
}

#[test]
fn scenario_age_eight_normal_sinus_seed_12345() {
    let rec = synthesize(&clean_request(8.0, "Normal sinus", 12345)).unwrap();

    // Resolver target near the age-8 anchor (~85 bpm) and the schedule
    // realizes it within a few percent.
    assert!(
        rec.targets.hr_bpm > 70.0 && rec.targets.hr_bpm < 100.0,
        "target HR {}",
        rec.targets.hr_bpm
    );
    let realized = rec.targets.hrv.mean_hr_bpm();
    let err = (realized - rec.targets.hr_bpm).abs() / rec.targets.hr_bpm;
    assert!(err < 0.06, "realized {realized} vs target {}", rec.targets.hr_bpm);

    assert!(rec.integrity.einthoven_max_residual_uv <= 2.0);
}

#[test]
fn scenario_complete_block_rates_unrelated() {
    // The schedule-level independence is asserted in the rhythm unit tests;
    // here the end-to-end record must carry a ventricular rate far below the
    // atrial (sinus) target.
    let rec = synthesize(&clean_request(8.0, "3rd degree AVB", 777)).unwrap();
    let ventricular = rec.targets.hrv.mean_hr_bpm();
    assert!(
        (ventricular - 45.0).abs() < 8.0,
        "escape rate {ventricular} bpm"
    );
    assert!(rec.targets.hr_bpm > ventricular * 1.4, "no dissociation");
}

#[test]
fn rate_fidelity_except_documented_exemptions() {
    // Sinus-family diagnoses track their resolved target.
    for dx in ["Normal sinus", "Sinus bradycardia", "Sinus tachycardia", "1st degree AVB"] {
        let rec = synthesize(&clean_request(8.0, dx, 21)).unwrap();
        let realized = rec.targets.hrv.mean_hr_bpm();
        let err = (realized - rec.targets.hr_bpm).abs() / rec.targets.hr_bpm;
        assert!(err < 0.08, "{dx}: realized {realized} vs {}", rec.targets.hr_bpm);
    }

    // Exempt: flutter's ventricular rate comes from the circuit and the
    // conduction ratio, not the sinus target.
    let flutter = synthesize(&clean_request(8.0, "Atrial flutter", 21)).unwrap();
    let realized = flutter.targets.hrv.mean_hr_bpm();
    assert!((realized - 150.0).abs() < 10.0, "flutter rate {realized}");
}

#[test]
fn unknown_diagnosis_behaves_like_normal_sinus() {
    let known = synthesize(&clean_request(8.0, "Normal sinus", 55)).unwrap();
    let unknown = synthesize(&clean_request(8.0, "Totally Made Up", 55)).unwrap();
    assert_eq!(known.leads_uv, unknown.leads_uv);
    // The label is echoed verbatim even when unrecognized.
    assert_eq!(unknown.targets.dx, "Totally Made Up");
}

#[test]
fn pediatric_axis_shifts_with_age() {
    let infant = resolve(0.05, None, "Normal sinus", 2);
    let teen = resolve(15.0, None, "Normal sinus", 2);
    assert!(
        infant.qrs_axis_deg > teen.qrs_axis_deg + 15.0,
        "infant {} vs teen {}",
        infant.qrs_axis_deg,
        teen.qrs_axis_deg
    );
}

#[test]
fn svt_runs_fast_with_suppressed_variability() {
    let rec = synthesize(&clean_request(6.0, "SVT (narrow)", 13)).unwrap();
    assert!(rec.targets.hrv.mean_hr_bpm() > 180.0);
    assert!(rec.targets.hrv.sdnn_ms < 15.0);
}
