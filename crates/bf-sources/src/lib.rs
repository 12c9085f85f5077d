//! bf-sources: absorption and spatial distribution models for moving heat
//! sources.
//!
//! Provides:
//! - `AbsorptionModel`: aspect ratio -> absorbed fraction of beam power
//! - `HeatSourceShape` trait with one file per distribution
//! - `ShapeModel`: tagged dispatch over the distributions
//! - `HeatSource`: dimensions plus optional transient depth tracking
//!
//! Every distribution is expressed in the beam frame: `d` is the offset of a
//! point from the beam centre and material lies at `d.z <= 0`.

pub mod absorption;
pub mod common;
pub mod error;
pub mod heat_source;
pub mod model;
pub mod modified_super_gaussian;
pub mod projected_gaussian;
pub mod spot_ring;
pub mod super_gaussian;
pub mod traits;

pub use absorption::{AbsorptionKind, AbsorptionModel, CavityGeometry};
pub use error::{SourceError, SourceResult};
pub use heat_source::{HeatSource, TransientDepth};
pub use model::{ShapeKind, ShapeModel};
pub use modified_super_gaussian::ModifiedSuperGaussian;
pub use projected_gaussian::ProjectedGaussian;
pub use spot_ring::SpotRing;
pub use super_gaussian::SuperGaussian;
pub use traits::HeatSourceShape;
