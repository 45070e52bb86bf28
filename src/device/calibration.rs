//! Age-dependent output amplitude calibration.
//!
//! Final gain correction fitted against published pediatric reference
//! amplitudes (Rijnbeek 2001 / Davignon 1979): right-precordial voltages
//! dominate in infancy and recede with age while left-precordial voltages
//! grow into adolescence. Precordial leads are calibrated individually;
//! every limb and augmented lead shares one scale factor so Einthoven's law
//! is untouched by calibration.

use crate::types::{LeadSet, Real};

/// Anchor ages for the gain tables, years.
const GAIN_AGES: [Real; 4] = [0.0, 1.0, 8.0, 21.0];

/// Shared gain for I, II, III, aVR, aVL, aVF.
const LIMB_GAIN: [Real; 4] = [0.90, 0.96, 1.05, 1.00];

fn interp(age: Real, table: &[Real; 4]) -> Real {
    let age = age.clamp(GAIN_AGES[0], GAIN_AGES[3]);
    let mut hi = 1;
    while hi < GAIN_AGES.len() - 1 && GAIN_AGES[hi] < age {
        hi += 1;
    }
    let lo = hi - 1;
    let frac = (age - GAIN_AGES[lo]) / (GAIN_AGES[hi] - GAIN_AGES[lo]);
    table[lo] + frac * (table[hi] - table[lo])
}

/// Per-lead gain at `age`, or the shared limb gain for limb/augmented leads.
#[must_use]
pub fn lead_gain(name: &str, age: Real) -> Real {
    let table: &[Real; 4] = match name {
        "V1" => &[1.35, 1.20, 0.95, 0.85],
        "V2" => &[1.30, 1.18, 1.00, 0.92],
        "V3" => &[1.15, 1.08, 1.02, 0.98],
        "V4" => &[1.00, 1.05, 1.10, 1.05],
        "V5" => &[0.92, 1.00, 1.12, 1.08],
        "V6" => &[0.85, 0.95, 1.10, 1.05],
        "V3R" => &[1.30, 1.15, 0.90, 0.80],
        "V4R" => &[1.25, 1.10, 0.88, 0.80],
        "V7" => &[0.80, 0.88, 1.00, 0.98],
        // All limb-derived leads share one factor.
        _ => &LIMB_GAIN,
    };
    interp(age, table)
}

/// Applies the calibration to every lead in place.
pub fn apply(leads: &mut LeadSet, age: Real) {
    for (name, samples) in leads.iter_mut() {
        let gain = lead_gain(name, age);
        for v in samples.iter_mut() {
            *v *= gain;
        }
    }
}
