//! The final output document of a synthesis call.
//!
//! Field names (and the serialized form under the `serde` feature) follow the
//! EKGQuest ECG-JSON schema consumed by the viewer, report and validation
//! collaborators: integer microvolt samples per named lead, a `targets` block
//! describing what the generator was asked to produce, and an `integrity`
//! block recording the worst observed cross-lead physics residuals.

use std::collections::BTreeMap;

use crate::types::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Version of the record schema emitted by this crate.
pub const SCHEMA_VERSION: &str = "1.1.0";

/// Seed-derived synthesis targets and provenance metadata.
///
/// These are the *requested* quantities; a downstream measurement pipeline
/// re-derives its own values from the waveform and compares.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Targets {
    /// Always true for generated records.
    pub synthetic: bool,

    /// Version of the generator that produced the record.
    pub generator_version: String,

    /// Age used for parameter resolution, in years.
    pub age_years: Real,

    /// Sex label used for anchor offsets ("M"/"F").
    pub sex: String,

    /// Diagnosis label.
    pub dx: String,

    /// Target heart rate in beats per minute.
    #[cfg_attr(feature = "serde", serde(rename = "HR_bpm"))]
    pub hr_bpm: Real,

    /// Target PR interval in milliseconds.
    #[cfg_attr(feature = "serde", serde(rename = "PR_ms"))]
    pub pr_ms: i32,

    /// Target QRS duration in milliseconds.
    #[cfg_attr(feature = "serde", serde(rename = "QRS_ms"))]
    pub qrs_ms: i32,

    /// Target QT interval in milliseconds.
    #[cfg_attr(feature = "serde", serde(rename = "QT_ms"))]
    pub qt_ms: i32,

    /// Target corrected QT in milliseconds.
    #[cfg_attr(feature = "serde", serde(rename = "QTc_ms"))]
    pub qtc_ms: i32,

    /// Electrical axes in degrees, keyed "P"/"QRS"/"T".
    pub axes_deg: BTreeMap<String, Real>,

    /// HRV summary of the generated schedule.
    pub hrv: crate::types::HrvSummary,

    /// Device preset label (e.g. "diagnostic").
    pub device_mode: String,

    /// Case seed the record was generated from.
    pub seed: u64,
}

/// Worst-case cross-lead physics residuals measured on the final integer
/// leads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Integrity {
    /// Maximum of `|I + III - II|` in microvolts.
    #[cfg_attr(feature = "serde", serde(rename = "einthoven_max_residual_uV"))]
    pub einthoven_max_residual_uv: Real,

    /// Maximum of `|aVR + aVL + aVF|` in microvolts.
    #[cfg_attr(feature = "serde", serde(rename = "augmented_max_residual_uV"))]
    pub augmented_max_residual_uv: Real,
}

/// A complete synthesized ECG record.
///
/// Created once per synthesis call and never mutated after return. All lead
/// arrays share identical length `floor(duration_s * fs)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EcgRecord {
    /// Record schema version.
    pub schema_version: String,

    /// Output sample rate in Hz.
    pub fs: u32,

    /// Record duration in seconds.
    pub duration_s: Real,

    /// Lead name to signed 16-bit samples in microvolts.
    #[cfg_attr(feature = "serde", serde(rename = "leads_uV"))]
    pub leads_uv: BTreeMap<String, Vec<i16>>,

    /// Synthesis targets and provenance.
    pub targets: Targets,

    /// Cross-lead physics residuals.
    pub integrity: Integrity,
}

impl EcgRecord {
    /// Number of samples per lead.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.leads_uv.values().next().map_or(0, Vec::len)
    }

    /// Returns one lead converted to millivolt floats, if present.
    #[must_use]
    pub fn lead_mv(&self, name: &str) -> Option<Vec<Real>> {
        self.leads_uv
            .get(name)
            .map(|s| s.iter().map(|&v| Real::from(v) / 1000.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HrvSummary;

    fn dummy_record() -> EcgRecord {
        let mut leads_uv = BTreeMap::new();
        leads_uv.insert("I".to_string(), vec![0i16, 500, -500]);
        leads_uv.insert("II".to_string(), vec![100i16, 700, -200]);
        EcgRecord {
            schema_version: SCHEMA_VERSION.to_string(),
            fs: 500,
            duration_s: 0.006,
            leads_uv,
            targets: Targets {
                synthetic: true,
                generator_version: crate::VERSION.to_string(),
                age_years: 8.0,
                sex: "M".to_string(),
                dx: "Normal sinus".to_string(),
                hr_bpm: 85.0,
                pr_ms: 130,
                qrs_ms: 80,
                qt_ms: 340,
                qtc_ms: 410,
                axes_deg: BTreeMap::new(),
                hrv: HrvSummary::default(),
                device_mode: "diagnostic".to_string(),
                seed: 42,
            },
            integrity: Integrity::default(),
        }
    }

    #[test]
    fn test_n_samples_and_lead_mv() {
        let rec = dummy_record();
        assert_eq!(rec.n_samples(), 3);
        let mv = rec.lead_mv("I").unwrap();
        assert!((mv[1] - 0.5).abs() < 1e-12);
        assert!(rec.lead_mv("V9").is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialized_field_names_match_schema() {
        let rec = dummy_record();
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("leads_uV").is_some());
        assert!(json["targets"].get("HR_bpm").is_some());
        assert!(json["targets"].get("QTc_ms").is_some());
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
    }
}
