//! bf-core: stable foundation for beamflow.
//!
//! Contains:
//! - numeric (Real + tolerances)
//! - geometry (Vec3 + axis-aligned bounding boxes)
//! - units (uom SI types + constructors)
//! - timing (opt-in accumulating timers)

pub mod geometry;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use geometry::*;
pub use numeric::*;
pub use units::*;
