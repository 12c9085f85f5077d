//! Gaussian cross-section projected along depth with an adaptive profile.

use std::f64::consts::PI;

use crate::common::{depth, gamma};
use crate::error::{SourceError, SourceResult};
use crate::traits::HeatSourceShape;
use bf_core::{Real, Vec3};

/// Largest exponent of two used for the depth profile sharpness.
const MAX_LOG2_K: Real = 9.0;

/// Horizontal Gaussian `exp(-2 (r/D)^2)` times a depth decay
/// `exp(-3 (ζ/D_z)^k)`.
///
/// The sharpness `k = 2^n` with `n = clamp(A log2(max(D_z / S_x, 1)) + B, 0, 9)`
/// follows the aspect ratio against the static half-width `S_x`: shallow
/// pools decay smoothly, deep keyholes approach a uniform column.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGaussian {
    a: Real,
    b: Real,
    k: Real,
}

impl ProjectedGaussian {
    pub fn new(a: Real, b: Real) -> SourceResult<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(SourceError::InvalidParameter {
                what: "projected Gaussian A and B must be finite",
            });
        }
        Ok(Self { a, b, k: 2.0_f64.powf(b.clamp(0.0, MAX_LOG2_K)) })
    }

    /// Current depth profile exponent.
    pub fn k(&self) -> Real {
        self.k
    }

    pub fn exponent(&self, dims: &Vec3, static_dims: &Vec3) -> Real {
        let x = (dims.z / static_dims.x).max(1.0);
        let n = (self.a * x.log2() + self.b).clamp(0.0, MAX_LOG2_K);
        2.0_f64.powf(n)
    }
}

impl HeatSourceShape for ProjectedGaussian {
    fn name(&self) -> &'static str {
        "projected_gaussian"
    }

    fn weight(&self, d: &Vec3, dims: &Vec3) -> Real {
        let zeta = depth(d);
        if zeta < 0.0 {
            return 0.0;
        }
        let horizontal = (-2.0 * ((d.x / dims.x).powi(2) + (d.y / dims.y).powi(2))).exp();
        let vertical = (-3.0 * (zeta / dims.z).powf(self.k)).exp();
        horizontal * vertical
    }

    fn reference_volume(&self, dims: &Vec3) -> Real {
        0.5 * PI * dims.x * dims.y * dims.z * gamma(1.0 / self.k)
            / (self.k * 3.0_f64.powf(1.0 / self.k))
    }

    fn resolution_scale(&self, dims: &Vec3) -> Real {
        0.5 * dims.min()
    }

    fn on_dimensions_changed(&mut self, dims: &Vec3, static_dims: &Vec3) {
        self.k = self.exponent(dims, static_dims);
    }
}
