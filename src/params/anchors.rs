//! Age-anchor tables and interpolation for parameter resolution.
//!
//! Anchor values are the Rijnbeek 2001 pediatric reference medians (boys,
//! per age bin midpoint), extended with a young-adult anchor so ages above
//! the pediatric range resolve smoothly. Interpolation is piecewise linear
//! with clamping at both ends.

use crate::types::Real;

/// Anchor ages in years: midpoints of the Rijnbeek age bins plus a young
/// adult extension.
pub const ANCHOR_AGES: [Real; 10] = [0.04, 0.17, 0.375, 0.75, 2.0, 4.0, 6.5, 10.0, 14.0, 21.0];

/// Heart rate medians, bpm.
pub const HR_BPM: [Real; 10] = [160.0, 152.0, 134.0, 128.0, 119.0, 98.0, 88.0, 78.0, 73.0, 68.0];

/// PR interval medians, ms.
pub const PR_MS: [Real; 10] = [99.0, 98.0, 106.0, 114.0, 118.0, 121.0, 129.0, 134.0, 139.0, 150.0];

/// QRS duration medians, ms.
pub const QRS_MS: [Real; 10] = [67.0, 64.0, 66.0, 69.0, 71.0, 75.0, 80.0, 85.0, 91.0, 95.0];

/// Corrected QT medians, ms.
pub const QTC_MS: [Real; 10] = [
    413.0, 419.0, 422.0, 411.0, 412.0, 412.0, 411.0, 411.0, 407.0, 410.0,
];

/// QRS axis medians, degrees. Strongly rightward at birth.
pub const QRS_AXIS_DEG: [Real; 10] = [97.0, 87.0, 66.0, 68.0, 64.0, 70.0, 70.0, 70.0, 65.0, 58.0];

/// P axis, degrees. Nearly flat over childhood.
pub const P_AXIS_DEG: [Real; 10] = [55.0, 54.0, 52.0, 51.0, 50.0, 49.0, 48.0, 47.0, 46.0, 45.0];

/// T axis, degrees.
pub const T_AXIS_DEG: [Real; 10] = [35.0, 36.0, 38.0, 40.0, 42.0, 43.0, 44.0, 45.0, 45.0, 45.0];

/// Right-ventricular dominance weight: 1 at birth, gone by age 3.
pub const RV_DOMINANCE: [Real; 10] = [1.0, 0.9, 0.7, 0.5, 0.2, 0.05, 0.0, 0.0, 0.0, 0.0];

/// Juvenile T-wave weight (anterior T inversion): persists through mid
/// childhood, gone by 16.
pub const JUVENILE_T: [Real; 10] = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.9, 0.6, 0.2, 0.0];

/// Overall voltage scale relative to the adult dipole.
pub const VOLTAGE_SCALE: [Real; 10] = [0.80, 0.85, 0.90, 0.95, 1.05, 1.10, 1.10, 1.05, 1.00, 1.00];

/// Septal activation depth (dipole tilt control, dimensionless).
pub const SEPTAL_DEPTH: [Real; 10] = [0.40, 0.38, 0.35, 0.33, 0.30, 0.28, 0.26, 0.25, 0.24, 0.24];

/// Apical activation depth (dipole tilt control, dimensionless).
pub const APICAL_DEPTH: [Real; 10] = [0.25, 0.26, 0.28, 0.30, 0.32, 0.33, 0.34, 0.35, 0.35, 0.35];

/// Piecewise-linear interpolation of `values` over [`ANCHOR_AGES`], clamped
/// at both ends.
#[must_use]
pub fn interpolate(age_years: Real, values: &[Real; 10]) -> Real {
    let age = age_years.clamp(ANCHOR_AGES[0], ANCHOR_AGES[9]);

    let mut hi = 1;
    while hi < ANCHOR_AGES.len() - 1 && ANCHOR_AGES[hi] < age {
        hi += 1;
    }
    let lo = hi - 1;

    let span = ANCHOR_AGES[hi] - ANCHOR_AGES[lo];
    let frac = (age - ANCHOR_AGES[lo]) / span;
    values[lo] + frac * (values[hi] - values[lo])
}
