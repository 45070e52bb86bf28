//! Electrode geometry, forward projection and algebraic lead derivation.
//!
//! Each electrode is a fixed unit direction in the body frame; its potential
//! is the dot product of the rotated dipole with that direction. Clinical
//! leads are then *derived* from electrode differences, never modeled
//! independently, which is what guarantees Einthoven's law and the
//! augmented-lead identity downstream.

use nalgebra::{Rotation3, Vector3};

use crate::types::{Electrode, ElectrodePotentials, LeadSet, Real, Vcg};

/// Fixed unit direction for an electrode in the body frame
/// (x left, y inferior, z anterior).
#[must_use]
pub fn electrode_direction(e: Electrode) -> Vector3<Real> {
    let (x, y, z) = match e {
        Electrode::Ra => (-0.90, -0.35, 0.08),
        Electrode::La => (0.90, -0.35, 0.08),
        Electrode::Ll => (0.30, 0.95, 0.05),
        Electrode::V1 => (-0.40, 0.10, 0.90),
        Electrode::V2 => (-0.10, 0.15, 0.95),
        Electrode::V3 => (0.25, 0.25, 0.90),
        Electrode::V4 => (0.55, 0.35, 0.75),
        Electrode::V5 => (0.80, 0.30, 0.50),
        Electrode::V6 => (0.95, 0.25, 0.20),
        Electrode::V3r => (-0.50, 0.25, 0.80),
        Electrode::V4r => (-0.70, 0.30, 0.60),
        Electrode::V7 => (0.90, 0.20, -0.35),
    };
    Vector3::new(x, y, z).normalize()
}

/// Projects the rotated dipole onto every electrode.
#[must_use]
pub fn project(vcg: &Vcg, rotation: &Rotation3<Real>) -> ElectrodePotentials {
    let mut potentials = ElectrodePotentials::zeros(vcg.len());

    // Precompute rotated electrode directions: u' . (R d) == (R^T u') . d.
    let directions: Vec<(Electrode, Vector3<Real>)> = Electrode::ALL
        .iter()
        .map(|&e| (e, rotation.inverse_transform_vector(&electrode_direction(e))))
        .collect();

    for (e, u) in directions {
        let trace = potentials.get_mut(e);
        for i in 0..vcg.len() {
            trace[i] = u.x * vcg.x[i] + u.y * vcg.y[i] + u.z * vcg.z[i];
        }
    }

    potentials
}

fn difference(a: &[Real], b: &[Real]) -> Vec<Real> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Derives the standard (and optionally extended) leads from electrode
/// potentials.
///
/// Limb leads are electrode differences, augmented leads the Goldberger
/// combinations, precordial leads referenced to the Wilson central terminal.
#[must_use]
pub fn derive_leads(potentials: &ElectrodePotentials, include_extended: bool) -> LeadSet {
    let ra = potentials.get(Electrode::Ra);
    let la = potentials.get(Electrode::La);
    let ll = potentials.get(Electrode::Ll);
    let n = potentials.len();

    let mut leads = LeadSet::new();

    leads.insert("I", difference(la, ra));
    leads.insert("II", difference(ll, ra));
    leads.insert("III", difference(ll, la));

    let mut avr = Vec::with_capacity(n);
    let mut avl = Vec::with_capacity(n);
    let mut avf = Vec::with_capacity(n);
    let mut wct = Vec::with_capacity(n);
    for i in 0..n {
        avr.push(ra[i] - 0.5 * (la[i] + ll[i]));
        avl.push(la[i] - 0.5 * (ra[i] + ll[i]));
        avf.push(ll[i] - 0.5 * (ra[i] + la[i]));
        wct.push((ra[i] + la[i] + ll[i]) / 3.0);
    }
    leads.insert("aVR", avr);
    leads.insert("aVL", avl);
    leads.insert("aVF", avf);

    let precordial: &[(&str, Electrode)] = &[
        ("V1", Electrode::V1),
        ("V2", Electrode::V2),
        ("V3", Electrode::V3),
        ("V4", Electrode::V4),
        ("V5", Electrode::V5),
        ("V6", Electrode::V6),
    ];
    let extended: &[(&str, Electrode)] = &[
        ("V3R", Electrode::V3r),
        ("V4R", Electrode::V4r),
        ("V7", Electrode::V7),
    ];

    for &(name, e) in precordial {
        leads.insert(name, difference(potentials.get(e), &wct));
    }
    if include_extended {
        for &(name, e) in extended {
            leads.insert(name, difference(potentials.get(e), &wct));
        }
    }

    leads
}
