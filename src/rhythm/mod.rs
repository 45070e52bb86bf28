//! Rhythm scheduling: parameters -> time-ordered [`BeatEvent`] list.
//!
//! A base periodic atrial schedule (heart rate -> R-R interval) is perturbed
//! by the three-band HRV modulator plus white jitter, then expanded into beat
//! events according to the diagnosis's rhythm class. The scheduler also
//! computes the HRV summary statistics carried into the output record.

mod ectopy;
mod hrv;

pub use ectopy::{step as ectopy_step, EctopyState};
pub use hrv::HrvModulator;

use crate::params::{Diagnosis, EctopicKind, ParameterSet, RhythmClass};
use crate::types::{BeatEvent, Hertz, HrvSummary, Real, Seconds};
use crate::utils::Random;

/// The scheduler's full output for one case.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Ordered beat events.
    pub beats: Vec<BeatEvent>,
    /// Summary statistics of the generated ventricular intervals.
    pub hrv: HrvSummary,
    /// Respiratory frequency of this case (drives amplitude modulation in
    /// the source model).
    pub respiratory_hz: Hertz,
    /// Respiratory phase offset, radians.
    pub respiratory_phase: Real,
}

/// Minimum interval the schedule will emit, seconds.
const MIN_INTERVAL_S: Seconds = 0.20;

/// Builds the beat schedule for one case.
#[must_use]
pub fn schedule(
    params: &ParameterSet,
    dx: &Diagnosis,
    duration_s: Seconds,
    rng: &mut Random,
) -> Schedule {
    let rr0 = params.rr_s();

    let modulator = match dx.rhythm {
        RhythmClass::Flutter { .. } | RhythmClass::RateOnly { .. } => HrvModulator::suppressed(),
        _ => HrvModulator::new_for(params, rng),
    };

    let beats = match dx.rhythm {
        RhythmClass::Sinus => {
            let atrial = atrial_times(rr0, duration_s, &modulator, rng);
            atrial
                .iter()
                .map(|&t| BeatEvent::conducted(t, params.pr_s))
                .collect()
        }
        RhythmClass::FixedRatioBlock { p_per_qrs } => {
            let atrial = atrial_times(rr0, duration_s, &modulator, rng);
            atrial
                .iter()
                .enumerate()
                .map(|(i, &t)| {
                    if i as u32 % p_per_qrs == 0 {
                        BeatEvent::conducted(t, params.pr_s)
                    } else {
                        BeatEvent::blocked(t)
                    }
                })
                .collect()
        }
        RhythmClass::Wenckebach { cycle } => {
            let atrial = atrial_times(rr0, duration_s, &modulator, rng);
            wenckebach_beats(&atrial, params.pr_s, cycle)
        }
        RhythmClass::CompleteDissociation {
            ventricular_rate_bpm,
        } => dissociated_beats(params, ventricular_rate_bpm, duration_s, &modulator, rng),
        RhythmClass::Ectopy {
            kind,
            base_prob,
            cluster_prob,
        } => {
            let atrial = atrial_times(rr0, duration_s, &modulator, rng);
            ectopic_beats(&atrial, params, kind, base_prob, cluster_prob, rr0, rng)
        }
        RhythmClass::Flutter {
            atrial_rate_bpm,
            conduction_ratio,
        } => {
            let rr_v = f64::from(conduction_ratio) * 60.0 / atrial_rate_bpm;
            regular_ventricular(rr_v, duration_s, 0.005, rng)
        }
        RhythmClass::RateOnly { suppress_p } => {
            let times = regular_times(rr0, duration_s, 0.003, rng);
            times
                .iter()
                .map(|&t| {
                    let mut b = BeatEvent::conducted(t, params.pr_s);
                    b.has_p = !suppress_p;
                    b
                })
                .collect()
        }
    };

    let hrv = summarize(&beats);

    Schedule {
        beats,
        hrv,
        respiratory_hz: modulator.respiratory_hz(),
        respiratory_phase: modulator.respiratory_phase(0.0),
    }
}

impl HrvModulator {
    fn new_for(params: &ParameterSet, rng: &mut Random) -> Self {
        // Recover an age proxy from the resolved rate so the modulator does
        // not need the raw age: the anchor tables are monotone in age.
        let age_proxy = ((160.0 - params.hr_bpm) / 6.0).clamp(0.0, 16.0);
        HrvModulator::new(age_proxy, rng)
    }
}

/// HRV-modulated atrial activation times covering `[0, duration_s)`.
fn atrial_times(
    rr0: Seconds,
    duration_s: Seconds,
    modulator: &HrvModulator,
    rng: &mut Random,
) -> Vec<Seconds> {
    let mut times = Vec::with_capacity((duration_s / rr0) as usize + 2);
    let mut t = rng.uniform_range(0.15, 0.15 + 0.5 * rr0);
    while t < duration_s {
        times.push(t);
        let rr = rr0 * modulator.factor(t) + modulator.draw_jitter(rr0, rng);
        t += rr.max(0.5 * rr0).max(MIN_INTERVAL_S);
    }
    times
}

/// Near-regular activation times with fractional jitter `jitter_frac`.
fn regular_times(
    rr: Seconds,
    duration_s: Seconds,
    jitter_frac: Real,
    rng: &mut Random,
) -> Vec<Seconds> {
    let mut times = Vec::with_capacity((duration_s / rr) as usize + 2);
    let mut t = rng.uniform_range(0.15, 0.15 + 0.5 * rr);
    while t < duration_s {
        times.push(t);
        let dt = rr * (1.0 + rng.normal(0.0, jitter_frac));
        t += dt.max(MIN_INTERVAL_S);
    }
    times
}

fn regular_ventricular(
    rr: Seconds,
    duration_s: Seconds,
    jitter_frac: Real,
    rng: &mut Random,
) -> Vec<BeatEvent> {
    regular_times(rr, duration_s, jitter_frac, rng)
        .iter()
        .map(|&t| BeatEvent::ventricular_only(t))
        .collect()
}

/// Wenckebach cycle: PR grows over `cycle` conducted beats, then one P drops.
fn wenckebach_beats(atrial: &[Seconds], pr_s: Seconds, cycle: u32) -> Vec<BeatEvent> {
    let cycle = cycle.max(2) as usize;
    let mut beats = Vec::with_capacity(atrial.len());
    for (i, &t) in atrial.iter().enumerate() {
        let pos = i % (cycle + 1);
        if pos == cycle {
            beats.push(BeatEvent::blocked(t));
        } else {
            let pr = pr_s * (1.0 + 0.40 * pos as Real / (cycle - 1).max(1) as Real);
            beats.push(BeatEvent::conducted(t, pr));
        }
    }
    beats
}

/// Complete dissociation: blocked sinus P waves over an independent, slower
/// ventricular escape.
fn dissociated_beats(
    params: &ParameterSet,
    ventricular_rate_bpm: Real,
    duration_s: Seconds,
    modulator: &HrvModulator,
    rng: &mut Random,
) -> Vec<BeatEvent> {
    let atrial = atrial_times(params.rr_s(), duration_s, modulator, rng);
    let rr_v = 60.0 / ventricular_rate_bpm;

    let mut beats: Vec<BeatEvent> = atrial.iter().map(|&t| BeatEvent::blocked(t)).collect();
    beats.extend(regular_ventricular(rr_v, duration_s, 0.01, rng));
    beats.sort_by(|a, b| a.time().total_cmp(&b.time()));
    beats
}

/// Sinus rhythm with interspersed premature beats driven by the ectopy state
/// machine.
fn ectopic_beats(
    atrial: &[Seconds],
    params: &ParameterSet,
    kind: EctopicKind,
    base_prob: Real,
    cluster_prob: Real,
    rr0: Seconds,
    rng: &mut Random,
) -> Vec<BeatEvent> {
    let mut beats = Vec::with_capacity(atrial.len() + 4);
    let mut state = EctopyState::Normal;
    // After a premature beat the next sinus cycle is disturbed: a PVC leaves
    // the following P blocked (compensatory pause), a PAC replaces it.
    let mut disturb_next = false;

    for (i, &t) in atrial.iter().enumerate() {
        if disturb_next {
            disturb_next = false;
            match kind {
                EctopicKind::Ventricular => beats.push(BeatEvent::blocked(t)),
                EctopicKind::Atrial => {}
            }
            continue;
        }

        beats.push(BeatEvent::conducted(t, params.pr_s));

        let (next_state, fired) = ectopy_step(state, base_prob, cluster_prob, rng);
        state = next_state;

        if fired {
            let rr_i = atrial.get(i + 1).map_or(rr0, |&next| next - t);
            let coupling = rng.uniform_range(0.55, 0.75);
            let t_ect = t + coupling * rr_i;

            match kind {
                EctopicKind::Ventricular => {
                    let mut b = BeatEvent::ventricular_only(t_ect);
                    b.is_ectopic_ventricular = true;
                    beats.push(b);
                }
                EctopicKind::Atrial => {
                    let mut b = BeatEvent::conducted(t_ect, params.pr_s);
                    b.is_ectopic_atrial = true;
                    beats.push(b);
                }
            }
            disturb_next = true;
        }
    }
    beats
}

/// HRV summary from the ventricular interval sequence (atrial when no
/// ventricular events exist, e.g. degenerate configurations).
fn summarize(beats: &[BeatEvent]) -> HrvSummary {
    let ventricular: Vec<Seconds> = beats.iter().filter_map(|b| b.ventricular_time).collect();
    let times = if ventricular.len() >= 2 {
        ventricular
    } else {
        beats.iter().filter_map(|b| b.atrial_time).collect()
    };

    let intervals: Vec<Seconds> = times.windows(2).map(|w| w[1] - w[0]).collect();
    HrvSummary::from_intervals(&intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{resolve, resolve_diagnosis};
    use crate::utils::{Random, Stage};

    fn run(dx_key: &str, age: f64, seed: u64) -> (Schedule, crate::params::ParameterSet) {
        let params = resolve(age, None, dx_key, seed);
        let dx = resolve_diagnosis(dx_key);
        let mut rng = Random::for_stage(seed, Stage::Rhythm);
        (schedule(&params, dx, 10.0, &mut rng), params)
    }

    fn assert_monotone(beats: &[BeatEvent]) {
        for w in beats.windows(2) {
            assert!(
                w[1].time() >= w[0].time() - 1e-9,
                "beats out of order: {} then {}",
                w[0].time(),
                w[1].time()
            );
        }
    }

    #[test]
    fn test_sinus_rate_matches_target() {
        let (sched, params) = run("Normal sinus", 8.0, 12345);
        let hr = sched.hrv.mean_hr_bpm();
        let err = (hr - params.hr_bpm).abs() / params.hr_bpm;
        assert!(err < 0.06, "scheduled {hr} vs target {}", params.hr_bpm);
        assert_monotone(&sched.beats);
    }

    #[test]
    fn test_sinus_every_beat_conducts() {
        let (sched, _) = run("Normal sinus", 5.0, 9);
        assert!(sched.beats.iter().all(|b| b.has_p && b.has_qrs));
    }

    #[test]
    fn test_two_to_one_block_halves_ventricular_rate() {
        let (sched, _) = run("2:1 AVB", 8.0, 21);
        let p_count = sched.beats.iter().filter(|b| b.has_p).count();
        let v_count = sched.beats.iter().filter(|b| b.has_qrs).count();
        assert!(v_count * 2 >= p_count - 2 && v_count * 2 <= p_count + 2);
    }

    #[test]
    fn test_wenckebach_pr_grows_then_drops() {
        let (sched, _) = run("2nd degree AVB (Mobitz I)", 10.0, 3);
        // Find a run of conducted beats between two blocked ones and check
        // PR growth within it.
        let conducted: Vec<&BeatEvent> = sched.beats.iter().filter(|b| b.has_qrs).collect();
        assert!(conducted.len() >= 4);
        let blocked = sched.beats.iter().filter(|b| b.has_p && !b.has_qrs).count();
        assert!(blocked >= 1, "no dropped beats in Wenckebach schedule");

        let mut saw_growth = false;
        for w in sched.beats.windows(2) {
            if let (Some(a), Some(b)) = (w[0].pr_interval, w[1].pr_interval) {
                if b > a + 0.005 {
                    saw_growth = true;
                }
            }
        }
        assert!(saw_growth, "PR never grew across the cycle");
    }

    #[test]
    fn test_complete_dissociation_rates_independent() {
        let (sched, params) = run("3rd degree AVB", 8.0, 777);

        let atrial: Vec<f64> = sched.beats.iter().filter_map(|b| b.atrial_time).collect();
        let ventricular: Vec<f64> = sched
            .beats
            .iter()
            .filter_map(|b| b.ventricular_time)
            .collect();

        let mean = |ts: &[f64]| {
            let iv: Vec<f64> = ts.windows(2).map(|w| w[1] - w[0]).collect();
            iv.iter().sum::<f64>() / iv.len() as f64
        };

        let atrial_hr = 60.0 / mean(&atrial);
        let ventricular_hr = 60.0 / mean(&ventricular);

        assert!((atrial_hr - params.hr_bpm).abs() / params.hr_bpm < 0.08);
        assert!((ventricular_hr - 45.0).abs() < 6.0);
        assert!(atrial_hr > ventricular_hr * 1.4);
    }

    #[test]
    fn test_pvc_schedule_contains_ectopics_with_pause() {
        // A long record at a deterministic seed contains at least one PVC.
        let params = resolve(8.0, None, "PVCs", 5);
        let dx = resolve_diagnosis("PVCs");
        let mut rng = Random::for_stage(5, Stage::Rhythm);
        let sched = schedule(&params, dx, 60.0, &mut rng);

        let ectopics: Vec<usize> = sched
            .beats
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_ectopic_ventricular)
            .map(|(i, _)| i)
            .collect();
        assert!(!ectopics.is_empty(), "no PVCs in 60 s at base_prob 0.08");

        // Each PVC is followed by a blocked P (compensatory pause).
        for &i in &ectopics {
            let next = sched.beats[i + 1..]
                .iter()
                .find(|b| b.atrial_time.is_some());
            if let Some(b) = next {
                assert!(!b.has_qrs, "post-PVC P conducted");
            }
        }
        assert_monotone(&sched.beats);
    }

    #[test]
    fn test_flutter_ventricular_rate() {
        let (sched, _) = run("Atrial flutter", 8.0, 11);
        // 300 bpm circuit at 2:1 conduction -> ~150 bpm ventricular.
        let hr = sched.hrv.mean_hr_bpm();
        assert!((hr - 150.0).abs() < 8.0, "flutter HR was {hr}");
        assert!(sched.beats.iter().all(|b| !b.has_p));
    }

    #[test]
    fn test_svt_suppresses_p_and_hrv() {
        let (sched, _) = run("SVT (narrow)", 8.0, 2);
        assert!(sched.beats.iter().all(|b| !b.has_p));
        // Suppressed modulator: interval spread collapses.
        assert!(sched.hrv.sdnn_ms < 15.0, "SDNN {}", sched.hrv.sdnn_ms);
        assert!(sched.hrv.mean_hr_bpm() > 180.0);
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let (a, _) = run("PACs", 4.0, 33);
        let (b, _) = run("PACs", 4.0, 33);
        assert_eq!(a.beats, b.beats);
    }
}
