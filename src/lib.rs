//! # Kardia - Synthetic 12-Lead ECG Generation in Rust
//!
//! Kardia is a deterministic, physiologically-motivated generator of synthetic
//! 12-lead pediatric electrocardiograms. Given an age, a diagnosis label and a
//! random seed it produces a multi-second, multi-lead voltage time series that
//! is exactly reproducible, respects cross-lead physical constraints
//! (Einthoven's law, the augmented-lead identity) and exhibits age- and
//! pathology-appropriate timing, morphology and noise.
//!
//! ## Overview
//!
//! Synthesis is a strict five-stage pipeline, each stage a pure function of
//! the previous stage's output plus a seeded pseudorandom stream derived from
//! the case seed:
//!
//! 1. **Parameter resolution**: age-interpolated anchor tables plus
//!    diagnosis-specific transforms produce a [`params::ParameterSet`].
//! 2. **Rhythm scheduling**: a heart-rate-variability-modulated atrial
//!    schedule is expanded into a list of [`types::BeatEvent`]s according to
//!    the diagnosis's rhythm class (conduction blocks, ectopy, flutter, ...).
//! 3. **Source modeling**: each beat is rendered into a 3-axis bioelectric
//!    dipole (vector cardiogram) from a small basis of parametric pulses.
//! 4. **Forward projection**: an age-dependent heart rotation and a fixed
//!    electrode geometry turn the dipole into electrode potentials, from
//!    which the standard leads are derived algebraically.
//! 5. **Device modeling**: correlated electrode-domain artifacts, a
//!    zero-phase filter chain, quantization, decimation and age-calibrated
//!    amplitude scaling produce the final integer-sample record.
//!
//! ## Quick Start
//!
//! ```rust
//! use kardia::prelude::*;
//!
//! let request = SynthesisRequest {
//!     age_years: 8.0,
//!     sex: None,
//!     dx: "Normal sinus".to_string(),
//!     seed: 12345,
//!     options: SynthesisOptions::default(),
//! };
//!
//! let record = synthesize(&request).unwrap();
//!
//! assert_eq!(record.fs, 500);
//! assert!(record.leads_uv.contains_key("II"));
//! assert!(record.targets.synthetic);
//! ```
//!
//! ## Determinism
//!
//! Identical `(age, sex, dx, seed, options)` inputs always produce
//! byte-identical output leads. Each pipeline stage draws from its own
//! ChaCha20 stream forked from the case seed, so no stage's consumption of
//! randomness can perturb another's.
//!
//! ## Feature Flags
//!
//! - `serde`: serialization support for the output record, all parameter
//!   structs, and the host request/response envelope.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::doc_markdown)]

pub mod device;
pub mod forward;
pub mod params;
pub mod rhythm;
pub mod source;
pub mod synth;
pub mod types;
pub mod utils;

#[cfg(feature = "serde")]
pub mod host;

/// Re-export of commonly used types for convenience.
pub mod prelude {
    pub use crate::device::{DeviceMode, NoiseLevel};
    pub use crate::params::{resolve, ParameterSet, Sex};
    pub use crate::source::SourceKind;
    pub use crate::synth::{synthesize, SynthesisOptions, SynthesisRequest};
    pub use crate::types::{BeatEvent, EcgRecord, HrvSummary, LeadSet};
    pub use crate::utils::Random;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library.
pub mod error {
    use thiserror::Error;

    /// Main error type for kardia operations.
    ///
    /// Physiological inputs never error: out-of-range ages, rates and
    /// intervals are clamped, and unknown diagnosis keys resolve to "no
    /// modification". Errors are reserved for structurally invalid
    /// configuration.
    #[derive(Error, Debug)]
    pub enum KardiaError {
        /// Invalid parameter value.
        #[error("Invalid parameter '{name}': {message}")]
        InvalidParameter {
            /// Name of the invalid parameter.
            name: &'static str,
            /// Description of the error.
            message: String,
        },

        /// Structurally invalid acquisition configuration.
        #[error("Invalid configuration: {0}")]
        InvalidConfiguration(String),

        /// Host envelope carried a command this library does not implement.
        #[cfg(feature = "serde")]
        #[error("Unknown command: {0}")]
        UnknownCommand(String),
    }

    /// Result type alias using KardiaError.
    pub type Result<T> = std::result::Result<T, KardiaError>;
}

pub use error::{KardiaError, Result};
