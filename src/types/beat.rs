//! Beat events and heart-rate-variability summaries.

use crate::types::{Real, Seconds};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One scheduled cardiac event.
///
/// A beat may carry atrial activity without ventricular capture (a blocked
/// P wave) or ventricular activity without a preceding P (an escape or
/// ectopic beat), so both timestamps are optional. The scheduler guarantees
/// that the emitted list is ordered and monotonically increasing in whichever
/// timestamp is present.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeatEvent {
    /// Atrial activation time, if the beat has atrial activity.
    pub atrial_time: Option<Seconds>,

    /// Ventricular activation time, if the beat conducts or originates below
    /// the AV node.
    pub ventricular_time: Option<Seconds>,

    /// Whether a P wave should be rendered.
    pub has_p: bool,

    /// Whether a QRS complex (and its T wave) should be rendered.
    pub has_qrs: bool,

    /// Ventricular ectopic origin (wide complex, discordant repolarization).
    pub is_ectopic_ventricular: bool,

    /// Atrial ectopic origin (early P with altered axis).
    pub is_ectopic_atrial: bool,

    /// PR interval used for this beat, when both chambers are linked.
    pub pr_interval: Option<Seconds>,
}

impl BeatEvent {
    /// A normally conducted sinus beat: P at `atrial_time`, QRS at a fixed PR
    /// offset.
    #[must_use]
    pub fn conducted(atrial_time: Seconds, pr_interval: Seconds) -> Self {
        Self {
            atrial_time: Some(atrial_time),
            ventricular_time: Some(atrial_time + pr_interval),
            has_p: true,
            has_qrs: true,
            is_ectopic_ventricular: false,
            is_ectopic_atrial: false,
            pr_interval: Some(pr_interval),
        }
    }

    /// A blocked atrial beat: P wave only.
    #[must_use]
    pub fn blocked(atrial_time: Seconds) -> Self {
        Self {
            atrial_time: Some(atrial_time),
            ventricular_time: None,
            has_p: true,
            has_qrs: false,
            is_ectopic_ventricular: false,
            is_ectopic_atrial: false,
            pr_interval: None,
        }
    }

    /// A ventricular event with no atrial linkage (escape or dissociated).
    #[must_use]
    pub fn ventricular_only(ventricular_time: Seconds) -> Self {
        Self {
            atrial_time: None,
            ventricular_time: Some(ventricular_time),
            has_p: false,
            has_qrs: true,
            is_ectopic_ventricular: false,
            is_ectopic_atrial: false,
            pr_interval: None,
        }
    }

    /// The reference time of the event: ventricular if present, else atrial.
    #[must_use]
    pub fn time(&self) -> Seconds {
        self.ventricular_time
            .or(self.atrial_time)
            .unwrap_or_default()
    }
}

/// Summary statistics of the generated beat-to-beat interval sequence.
///
/// Computed by the scheduler directly from the interval sequence it emitted
/// and carried into the output record's targets block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HrvSummary {
    /// Mean R-R interval in milliseconds.
    pub mean_rr_ms: Real,

    /// Standard deviation of R-R intervals (SDNN) in milliseconds.
    pub sdnn_ms: Real,

    /// Root mean square of successive differences (RMSSD) in milliseconds.
    pub rmssd_ms: Real,

    /// Number of ventricular beats in the record.
    pub n_beats: usize,
}

impl HrvSummary {
    /// Computes the summary from a sequence of R-R intervals in seconds.
    ///
    /// Returns the default (all-zero) summary for fewer than two intervals.
    #[must_use]
    pub fn from_intervals(intervals_s: &[Seconds]) -> Self {
        let n = intervals_s.len();
        if n < 2 {
            return Self {
                n_beats: n + usize::from(n > 0),
                ..Self::default()
            };
        }

        let ms: Vec<Real> = intervals_s.iter().map(|&rr| rr * 1000.0).collect();
        let mean = ms.iter().sum::<Real>() / n as Real;
        let var = ms.iter().map(|&v| (v - mean) * (v - mean)).sum::<Real>() / n as Real;
        let rmssd = (ms
            .windows(2)
            .map(|w| (w[1] - w[0]) * (w[1] - w[0]))
            .sum::<Real>()
            / (n - 1) as Real)
            .sqrt();

        Self {
            mean_rr_ms: mean,
            sdnn_ms: var.sqrt(),
            rmssd_ms: rmssd,
            n_beats: n + 1,
        }
    }

    /// Mean heart rate implied by the interval sequence, in bpm.
    #[must_use]
    pub fn mean_hr_bpm(&self) -> Real {
        if self.mean_rr_ms <= 0.0 {
            return 0.0;
        }
        60_000.0 / self.mean_rr_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conducted_beat_times() {
        let b = BeatEvent::conducted(1.0, 0.15);
        assert!(b.has_p && b.has_qrs);
        assert!((b.time() - 1.15).abs() < 1e-12);
        assert_eq!(b.pr_interval, Some(0.15));
    }

    #[test]
    fn test_blocked_beat_has_no_qrs() {
        let b = BeatEvent::blocked(2.0);
        assert!(b.has_p);
        assert!(!b.has_qrs);
        assert_eq!(b.ventricular_time, None);
        assert!((b.time() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_hrv_constant_intervals() {
        let intervals = vec![0.8; 10];
        let hrv = HrvSummary::from_intervals(&intervals);
        assert!((hrv.mean_rr_ms - 800.0).abs() < 1e-9);
        assert!(hrv.sdnn_ms.abs() < 1e-9);
        assert!(hrv.rmssd_ms.abs() < 1e-9);
        assert_eq!(hrv.n_beats, 11);
        assert!((hrv.mean_hr_bpm() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_hrv_alternating_intervals() {
        // 750/850 ms alternation: successive differences are all 100 ms.
        let intervals = vec![0.75, 0.85, 0.75, 0.85, 0.75];
        let hrv = HrvSummary::from_intervals(&intervals);
        assert!((hrv.mean_rr_ms - 790.0).abs() < 1e-9);
        assert!((hrv.rmssd_ms - 100.0).abs() < 1e-9);
        assert!(hrv.sdnn_ms > 0.0);
    }

    #[test]
    fn test_hrv_degenerate() {
        assert_eq!(HrvSummary::from_intervals(&[]).n_beats, 0);
        let one = HrvSummary::from_intervals(&[0.8]);
        assert_eq!(one.n_beats, 2);
        assert!(one.sdnn_ms.abs() < 1e-12);
    }
}
