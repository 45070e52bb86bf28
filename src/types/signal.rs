//! Signal containers for the intermediate pipeline stages.
//!
//! [`Vcg`] is the 3-axis dipole source produced by the morphology model,
//! [`ElectrodePotentials`] the projected per-electrode scalars, and
//! [`LeadSet`] the named clinical leads derived from them. All containers in
//! one synthesis run share a single sample length at the simulation rate.

use std::collections::BTreeMap;

use crate::types::{Millivolts, Real};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Vector cardiogram: the equivalent cardiac dipole sampled on three
/// orthogonal body axes (x: left, y: inferior, z: anterior).
///
/// All basis pulses accumulate additively into one shared instance; beats do
/// not allocate their own arrays.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vcg {
    /// Dipole component along the patient's left.
    pub x: Vec<Millivolts>,
    /// Dipole component toward the feet.
    pub y: Vec<Millivolts>,
    /// Dipole component toward the anterior chest.
    pub z: Vec<Millivolts>,
}

impl Vcg {
    /// Allocates a zeroed VCG of `len` samples.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            x: vec![0.0; len],
            y: vec![0.0; len],
            z: vec![0.0; len],
        }
    }

    /// Number of samples per axis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// True when the VCG holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Adds a dipole contribution at sample `i`. Out-of-range indices are
    /// ignored so pulse tails may extend past the record edge.
    #[inline]
    pub fn accumulate(&mut self, i: usize, dx: Millivolts, dy: Millivolts, dz: Millivolts) {
        if i < self.x.len() {
            self.x[i] += dx;
            self.y[i] += dy;
            self.z[i] += dz;
        }
    }
}

/// The modeled electrode sites.
///
/// Limb electrodes come first; the Wilson central terminal is derived from
/// them. `V3R`, `V4R` and `V7` support the optional right-sided and posterior
/// leads of a pediatric acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Electrode {
    /// Right arm.
    Ra,
    /// Left arm.
    La,
    /// Left leg.
    Ll,
    /// Precordial V1, fourth intercostal space right of sternum.
    V1,
    /// Precordial V2.
    V2,
    /// Precordial V3.
    V3,
    /// Precordial V4, apex.
    V4,
    /// Precordial V5.
    V5,
    /// Precordial V6, midaxillary.
    V6,
    /// Right-sided V3R.
    V3r,
    /// Right-sided V4R.
    V4r,
    /// Posterior V7.
    V7,
}

impl Electrode {
    /// All electrodes in storage order.
    pub const ALL: [Electrode; 12] = [
        Electrode::Ra,
        Electrode::La,
        Electrode::Ll,
        Electrode::V1,
        Electrode::V2,
        Electrode::V3,
        Electrode::V4,
        Electrode::V5,
        Electrode::V6,
        Electrode::V3r,
        Electrode::V4r,
        Electrode::V7,
    ];

    /// Storage index of this electrode.
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&e| e == self).unwrap_or(0)
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Electrode::Ra => "RA",
            Electrode::La => "LA",
            Electrode::Ll => "LL",
            Electrode::V1 => "V1",
            Electrode::V2 => "V2",
            Electrode::V3 => "V3",
            Electrode::V4 => "V4",
            Electrode::V5 => "V5",
            Electrode::V6 => "V6",
            Electrode::V3r => "V3R",
            Electrode::V4r => "V4R",
            Electrode::V7 => "V7",
        }
    }
}

/// Per-electrode potential traces, indexed by [`Electrode`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElectrodePotentials {
    traces: Vec<Vec<Millivolts>>,
    len: usize,
}

impl ElectrodePotentials {
    /// Allocates zeroed traces of `len` samples for every electrode.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            traces: vec![vec![0.0; len]; Electrode::ALL.len()],
            len,
        }
    }

    /// Number of samples per electrode.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the container holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Immutable access to one electrode's trace.
    #[must_use]
    pub fn get(&self, e: Electrode) -> &[Millivolts] {
        &self.traces[e.index()]
    }

    /// Mutable access to one electrode's trace.
    pub fn get_mut(&mut self, e: Electrode) -> &mut Vec<Millivolts> {
        &mut self.traces[e.index()]
    }
}

/// The standard 12 leads, in conventional display order.
pub const STANDARD_LEADS: [&str; 12] = [
    "I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
];

/// Optional right-sided and posterior leads.
pub const EXTENDED_LEADS: [&str; 3] = ["V3R", "V4R", "V7"];

/// A named set of derived lead traces in millivolts.
///
/// Backed by an ordered map so iteration (and any serialized form) is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeadSet {
    leads: BTreeMap<String, Vec<Millivolts>>,
}

impl LeadSet {
    /// Creates an empty lead set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a lead trace.
    pub fn insert(&mut self, name: &str, samples: Vec<Millivolts>) {
        self.leads.insert(name.to_string(), samples);
    }

    /// Returns a lead trace by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Millivolts]> {
        self.leads.get(name).map(Vec::as_slice)
    }

    /// Mutable access to a lead trace by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Millivolts>> {
        self.leads.get_mut(name)
    }

    /// Whether the set contains a lead.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.leads.contains_key(name)
    }

    /// Number of leads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leads.len()
    }

    /// True when no leads are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// Iterates leads in deterministic (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Millivolts])> {
        self.leads.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterates mutably over all lead traces.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<Millivolts>)> {
        self.leads.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Sample count of the first lead, or zero for an empty set.
    #[must_use]
    pub fn sample_len(&self) -> usize {
        self.leads.values().next().map_or(0, Vec::len)
    }

    /// Largest absolute residual of `I + III - II` across the record, in the
    /// unit of the stored samples.
    #[must_use]
    pub fn einthoven_residual(&self) -> Real {
        let (Some(i), Some(ii), Some(iii)) = (self.get("I"), self.get("II"), self.get("III"))
        else {
            return 0.0;
        };
        i.iter()
            .zip(ii)
            .zip(iii)
            .map(|((a, b), c)| (a + c - b).abs())
            .fold(0.0, Real::max)
    }

    /// Largest absolute residual of `aVR + aVL + aVF` across the record.
    #[must_use]
    pub fn augmented_residual(&self) -> Real {
        let (Some(r), Some(l), Some(f)) = (self.get("aVR"), self.get("aVL"), self.get("aVF"))
        else {
            return 0.0;
        };
        r.iter()
            .zip(l)
            .zip(f)
            .map(|((a, b), c)| (a + b + c).abs())
            .fold(0.0, Real::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcg_accumulate_ignores_out_of_range() {
        let mut vcg = Vcg::zeros(4);
        vcg.accumulate(2, 1.0, -1.0, 0.5);
        vcg.accumulate(100, 9.0, 9.0, 9.0);
        assert!((vcg.x[2] - 1.0).abs() < 1e-12);
        assert!((vcg.y[2] + 1.0).abs() < 1e-12);
        assert_eq!(vcg.len(), 4);
    }

    #[test]
    fn test_electrode_indices_unique() {
        let mut seen = std::collections::HashSet::new();
        for e in Electrode::ALL {
            assert!(seen.insert(e.index()));
        }
        assert_eq!(Electrode::Ra.index(), 0);
        assert_eq!(Electrode::V7.name(), "V7");
    }

    #[test]
    fn test_lead_set_residuals() {
        let mut leads = LeadSet::new();
        leads.insert("I", vec![0.2, 0.4]);
        leads.insert("II", vec![0.5, 0.9]);
        leads.insert("III", vec![0.3, 0.5]);
        assert!(leads.einthoven_residual() < 1e-12);

        leads.get_mut("II").unwrap()[0] = 0.6;
        assert!((leads.einthoven_residual() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_lead_set_missing_leads_are_neutral() {
        let leads = LeadSet::new();
        assert!(leads.einthoven_residual().abs() < 1e-12);
        assert!(leads.augmented_residual().abs() < 1e-12);
        assert_eq!(leads.sample_len(), 0);
    }
}
