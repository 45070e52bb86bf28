//! Forward model: dipole -> electrode potentials -> derived leads.

mod leads;
mod orientation;

pub use leads::{derive_leads, electrode_direction, project};
pub use orientation::heart_rotation;
