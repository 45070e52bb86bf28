//! Source (morphology) models: beat schedule -> vector cardiogram.
//!
//! Two implementations stand behind [`SourceModel`]: the physiologically
//! parameterized [`DipoleSource`] (default) and the simpler
//! [`TemplateSource`] that stamps beats from a fixed template bank. The
//! active model is chosen at configuration time via [`SourceKind`].

mod basis;
mod dipole;
mod template;

pub use basis::{
    asym_gaussian, gaussian, gen_gaussian, hermite, hermite_sum, sawtooth, sigmoid_plateau,
};
pub use dipole::DipoleSource;
pub use template::TemplateSource;

use crate::params::{MorphologyPlan, ParameterSet, RhythmClass};
use crate::rhythm::Schedule;
use crate::types::{Seconds, Vcg};
use crate::utils::Random;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything a source model may read while rendering one case.
pub struct SourceContext<'a> {
    /// The scheduled beats and HRV metadata.
    pub schedule: &'a Schedule,
    /// Resolved case parameters.
    pub params: &'a ParameterSet,
    /// Diagnosis morphology switches.
    pub morphology: &'a MorphologyPlan,
    /// Rhythm class (flutter rate lives here).
    pub rhythm: RhythmClass,
    /// Record duration in seconds.
    pub duration_s: Seconds,
}

/// A morphology model turning scheduled beats into a 3-axis dipole series.
pub trait SourceModel {
    /// Renders the full record's VCG. All randomness comes from `rng` (the
    /// case's source-stage stream); implementations hold no mutable state
    /// across calls.
    fn render(&self, ctx: &SourceContext<'_>, rng: &mut Random) -> Vcg;
}

/// Which source model implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SourceKind {
    /// Parametric dipole model (default).
    #[default]
    Dipole,
    /// Template-bank model.
    Template,
}

impl SourceKind {
    /// Instantiates the selected model.
    #[must_use]
    pub fn build(self) -> Box<dyn SourceModel> {
        match self {
            SourceKind::Dipole => Box::new(DipoleSource),
            SourceKind::Template => Box::new(TemplateSource),
        }
    }
}
