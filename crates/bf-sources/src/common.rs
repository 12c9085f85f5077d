//! Helpers shared by the distribution models.

use crate::error::{SourceError, SourceResult};
use bf_core::{Real, Vec3};

pub use statrs::function::gamma::gamma;

/// Depth below the beam plane. Negative above the surface.
#[inline]
pub fn depth(d: &Vec3) -> Real {
    -d.z
}

/// `2^(1/k)`: ratio between the nominal radius and the scale length of a
/// super-Gaussian of order `k`.
#[inline]
pub fn radius_factor(k: Real) -> Real {
    2.0_f64.powf(1.0 / k)
}

/// Width factor `(1 - u^m)^(1/m)` narrowing a lobe with normalised depth `u`.
#[inline]
pub fn narrowing(u: Real, m: Real) -> Real {
    (1.0 - u.powf(m)).max(0.0).powf(1.0 / m)
}

/// `∫_0^1 (1 - u^m)^(p/m) du` for the width exponents used by the models.
pub fn narrowing_integral(m: Real, p: Real) -> Real {
    gamma(1.0 + 1.0 / m) * gamma(1.0 + p / m) / gamma(1.0 + (p + 1.0) / m)
}

pub fn check_exponent(v: Real, what: &'static str) -> SourceResult<Real> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(SourceError::InvalidParameter { what })
    }
}
