//! Core data types shared across the synthesis pipeline.

mod beat;
mod primitives;
mod record;
mod signal;

pub use beat::{BeatEvent, HrvSummary};
pub use primitives::{
    sim_index, sim_len, Hertz, Millivolts, Real, Seconds, EPSILON, SIM_FS, UV_PER_MV,
};
pub use record::{EcgRecord, Integrity, Targets, SCHEMA_VERSION};
pub use signal::{
    Electrode, ElectrodePotentials, LeadSet, Vcg, EXTENDED_LEADS, STANDARD_LEADS,
};
