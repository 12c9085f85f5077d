//! bf-deposition: moving heat sources deposited onto a mesh.
//!
//! Provides:
//! - `DepositionIntegrator`: culled, sub-sampled cell integration with a
//!   bounded conservation correction
//! - `Source`: a beam with its distribution and absorption model
//! - `SubcyclingController`: per-beam time sub-cycling into one combined field
//! - `RefinementController`: refinement markers along upcoming beam paths

pub mod error;
pub mod integrator;
pub mod refinement;
pub mod settings;
pub mod source;
pub mod subcycling;

pub use error::{DepositionError, DepositionResult};
pub use integrator::{Correction, Deposition, DepositionIntegrator};
pub use refinement::{RefinementController, UniformIntervals};
pub use settings::DepositionSettings;
pub use source::Source;
pub use subcycling::{SourceReport, StepReport, SubcyclingController};
