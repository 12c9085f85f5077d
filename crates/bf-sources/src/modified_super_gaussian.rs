//! Super-Gaussian whose horizontal width narrows with depth.

use std::f64::consts::PI;

use crate::common::{check_exponent, depth, gamma, narrowing, narrowing_integral, radius_factor};
use crate::error::SourceResult;
use crate::traits::HeatSourceShape;
use bf_core::{Real, Vec3, vec3};

/// Horizontal super-Gaussian of order `k` whose width shrinks as
/// `(1 - (ζ/D_z)^m)^(1/m)`, vanishing at the depth bound `D_z`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedSuperGaussian {
    k: Real,
    m: Real,
}

impl ModifiedSuperGaussian {
    pub fn new(k: Real, m: Real) -> SourceResult<Self> {
        Ok(Self {
            k: check_exponent(k, "modified super-Gaussian k must be positive")?,
            m: check_exponent(m, "modified super-Gaussian m must be positive")?,
        })
    }

    pub fn k(&self) -> Real {
        self.k
    }

    pub fn m(&self) -> Real {
        self.m
    }

    fn scale(&self, dims: &Vec3) -> Vec3 {
        let a = radius_factor(self.k);
        vec3(dims.x / a, dims.y / a, dims.z)
    }
}

impl HeatSourceShape for ModifiedSuperGaussian {
    fn name(&self) -> &'static str {
        "modified_super_gaussian"
    }

    fn weight(&self, d: &Vec3, dims: &Vec3) -> Real {
        let zeta = depth(d);
        let s = self.scale(dims);
        if zeta < 0.0 || zeta >= s.z {
            return 0.0;
        }
        let g = narrowing(zeta / s.z, self.m);
        if g <= 0.0 {
            return 0.0;
        }
        let f = (d.x / (s.x * g)).powi(2) + (d.y / (s.y * g)).powi(2);
        (-f.powf(0.5 * self.k)).exp()
    }

    fn reference_volume(&self, dims: &Vec3) -> Real {
        let s = self.scale(dims);
        s.x * s.y * s.z * 2.0 * PI * gamma(2.0 / self.k) / self.k
            * narrowing_integral(self.m, 2.0)
    }

    fn resolution_scale(&self, dims: &Vec3) -> Real {
        self.scale(dims).min()
    }
}
