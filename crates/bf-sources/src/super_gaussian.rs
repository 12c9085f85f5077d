//! Super-Gaussian volumetric source.

use std::f64::consts::PI;

use crate::common::{check_exponent, depth, gamma, radius_factor};
use crate::error::SourceResult;
use crate::traits::HeatSourceShape;
use bf_core::{Real, Vec3};

/// `exp(-|d/s|^k)` with `s = dims / 2^(1/k)`. `k = 2` is a Gaussian.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperGaussian {
    k: Real,
}

impl SuperGaussian {
    pub fn new(k: Real) -> SourceResult<Self> {
        Ok(Self {
            k: check_exponent(k, "super-Gaussian k must be positive")?,
        })
    }

    pub fn k(&self) -> Real {
        self.k
    }

    fn scale(&self, dims: &Vec3) -> Vec3 {
        dims / radius_factor(self.k)
    }
}

impl HeatSourceShape for SuperGaussian {
    fn name(&self) -> &'static str {
        "super_gaussian"
    }

    fn weight(&self, d: &Vec3, dims: &Vec3) -> Real {
        let zeta = depth(d);
        if zeta < 0.0 {
            return 0.0;
        }
        let s = self.scale(dims);
        let f = (d.x / s.x).powi(2) + (d.y / s.y).powi(2) + (zeta / s.z).powi(2);
        (-f.powf(0.5 * self.k)).exp()
    }

    fn reference_volume(&self, dims: &Vec3) -> Real {
        let s = self.scale(dims);
        s.x * s.y * s.z * 2.0 * PI * gamma(3.0 / self.k) / self.k
    }

    fn resolution_scale(&self, dims: &Vec3) -> Real {
        self.scale(dims).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bf_core::vec3;

    #[test]
    fn gaussian_volume_closed_form() {
        let shape = SuperGaussian::new(2.0).unwrap();
        let dims = vec3(50e-6, 50e-6, 30e-6);
        // Half-space Gaussian with s = D / sqrt(2): π^(3/2) s³ / 2.
        let s = dims / 2.0_f64.sqrt();
        let expected = PI.powf(1.5) * s.x * s.y * s.z / 2.0;
        assert_relative_eq!(shape.reference_volume(&dims), expected, max_relative = 1e-6);
    }

    #[test]
    fn weight_is_one_at_centre_and_zero_above() {
        let shape = SuperGaussian::new(4.0).unwrap();
        let dims = vec3(1.0, 1.0, 1.0);
        assert_eq!(shape.weight(&Vec3::zeros(), &dims), 1.0);
        assert_eq!(shape.weight(&vec3(0.0, 0.0, 0.1), &dims), 0.0);
    }

    #[test]
    fn weight_at_nominal_radius() {
        // At |d| = dims the weight is exp(-2) for every k.
        for k in [1.0, 2.0, 6.0] {
            let shape = SuperGaussian::new(k).unwrap();
            let dims = vec3(2.0, 3.0, 1.0);
            assert_relative_eq!(
                shape.weight(&vec3(2.0, 0.0, 0.0), &dims),
                (-2.0f64).exp(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn rejects_non_positive_k() {
        assert!(SuperGaussian::new(0.0).is_err());
        assert!(SuperGaussian::new(Real::NAN).is_err());
    }
}
