//! Core trait for spatial heat source distributions.

use bf_core::{Real, Vec3};

/// Unnormalised power density around the beam centre.
///
/// `dims` are the current source dimensions: horizontal half-widths in x and
/// y, depth in z. Implementations are evaluated concurrently over mesh cells
/// and must not mutate during a call.
pub trait HeatSourceShape: Send + Sync {
    /// Model tag, as written in case files.
    fn name(&self) -> &'static str;

    /// Density at offset `d` from the beam centre. Zero above the surface
    /// (`d.z > 0`) and outside the declared depth bound.
    fn weight(&self, d: &Vec3, dims: &Vec3) -> Real;

    /// Integral of `weight` over all space.
    ///
    /// Models whose weight is already normalised return 1.
    fn reference_volume(&self, dims: &Vec3) -> Real;

    /// Half-extents of the region holding essentially all of the weight,
    /// before any culling margin is applied.
    fn support(&self, dims: &Vec3) -> Vec3 {
        *dims
    }

    /// Smallest length over which the weight varies appreciably.
    fn resolution_scale(&self, dims: &Vec3) -> Real {
        dims.min()
    }

    /// Refresh parameters derived from the dimensions.
    fn on_dimensions_changed(&mut self, _dims: &Vec3, _static_dims: &Vec3) {}
}
