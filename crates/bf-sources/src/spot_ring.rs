//! Composite spot + ring distribution for beam-shaping lasers.

use std::f64::consts::PI;

use crate::common::{check_exponent, depth, gamma, narrowing, narrowing_integral, radius_factor};
use crate::error::{SourceError, SourceResult};
use crate::traits::HeatSourceShape;
use bf_core::{Real, Vec3, vec3};

/// Fraction of power in the central spot, per preset mode.
const PRESET_ALPHA: [Real; 7] = [0.99, 0.83, 0.7, 0.54, 0.33, 0.21, 0.29];

/// Spot D4σ diameters (m), per preset mode.
const PRESET_SPOT_D4S: [Real; 7] = [
    156.99e-6, 158.23e-6, 165.31e-6, 182.28e-6, 181.15e-6, 214.63e-6, 402.04e-6,
];

/// Ring D4σ widths (m), per preset mode.
const PRESET_RING_D4S: [Real; 7] = [
    48.49e-6, 112.15e-6, 116.07e-6, 135.32e-6, 116.74e-6, 112.46e-6, 116.62e-6,
];

/// Overall D4σ diameters (m) from second moments of the fitted profiles.
const PRESET_BEAM_D4S: [Real; 7] = [
    162.12e-6, 235.39e-6, 283.97e-6, 283.97e-6, 340.0e-6, 385.18e-6, 413.13e-6,
];

/// Ring radius shared by every preset (m).
pub const PRESET_RING_RADIUS: Real = 152e-6;

/// Number of beam-shaping presets.
pub const PRESET_COUNT: usize = PRESET_ALPHA.len();

/// Convex combination of a central super-Gaussian spot and an annular
/// super-Gaussian ring, each narrowing with depth and each normalised on its
/// own so that the total integrates to one.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotRing {
    /// Fraction of power in the spot.
    pub alpha: Real,
    pub spot_radius: Real,
    pub spot_k: Real,
    pub spot_m: Real,
    pub ring_radius: Real,
    pub ring_half_width: Real,
    pub ring_k: Real,
    pub ring_m: Real,
}

impl SpotRing {
    pub fn validate(&self) -> SourceResult<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(SourceError::InvalidParameter {
                what: "spot/ring alpha must be in [0, 1]",
            });
        }
        check_exponent(self.spot_radius, "spot radius must be positive")?;
        check_exponent(self.ring_radius, "ring radius must be positive")?;
        check_exponent(self.ring_half_width, "ring half-width must be positive")?;
        for (v, what) in [
            (self.spot_k, "spot k must be positive"),
            (self.spot_m, "spot m must be positive"),
            (self.ring_k, "ring k must be positive"),
            (self.ring_m, "ring m must be positive"),
        ] {
            check_exponent(v, what)?;
        }
        Ok(())
    }

    /// Preset beam-shaping `mode` (0 to 6) with the given profile exponents.
    pub fn preset(
        mode: usize,
        spot: (Real, Real),
        ring: (Real, Real),
    ) -> SourceResult<SpotRing> {
        if mode >= PRESET_COUNT {
            return Err(SourceError::UnknownPreset { mode });
        }
        let shape = SpotRing {
            alpha: PRESET_ALPHA[mode],
            spot_radius: 0.5 * PRESET_SPOT_D4S[mode],
            spot_k: spot.0,
            spot_m: spot.1,
            ring_radius: PRESET_RING_RADIUS,
            ring_half_width: 0.5 * PRESET_RING_D4S[mode],
            ring_k: ring.0,
            ring_m: ring.1,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Horizontal half-width (second-moment radius) of preset `mode`.
    pub fn preset_half_width(mode: usize) -> SourceResult<Real> {
        PRESET_BEAM_D4S
            .get(mode)
            .map(|d| 0.5 * d)
            .ok_or(SourceError::UnknownPreset { mode })
    }

    fn spot_scale(&self) -> Real {
        self.spot_radius / radius_factor(self.spot_k)
    }

    fn ring_scale(&self) -> Real {
        self.ring_half_width / radius_factor(self.ring_k)
    }

    /// Spot cross-section area integrated over normalised depth.
    fn spot_area(&self) -> Real {
        let s = self.spot_scale();
        s * s * PI * gamma(1.0 + 2.0 / self.spot_k) * narrowing_integral(self.spot_m, 2.0)
    }

    /// Ring cross-section area integrated over normalised depth.
    fn ring_area(&self) -> Real {
        4.0 * PI
            * self.ring_radius
            * self.ring_scale()
            * gamma(1.0 + 1.0 / self.ring_k)
            * narrowing_integral(self.ring_m, 1.0)
    }
}

impl HeatSourceShape for SpotRing {
    fn name(&self) -> &'static str {
        "spot_ring"
    }

    fn weight(&self, d: &Vec3, dims: &Vec3) -> Real {
        let zeta = depth(d);
        if zeta < 0.0 || zeta >= dims.z {
            return 0.0;
        }
        let u = zeta / dims.z;
        let rho = d.x.hypot(d.y);

        let mut w = 0.0;
        let gs = narrowing(u, self.spot_m);
        if gs > 0.0 {
            let xs = (rho / (self.spot_scale() * gs)).powf(self.spot_k);
            w += self.alpha / (self.spot_area() * dims.z) * (-xs).exp();
        }
        let gr = narrowing(u, self.ring_m);
        if gr > 0.0 {
            let xr = ((rho - self.ring_radius).abs() / (self.ring_scale() * gr)).powf(self.ring_k);
            w += (1.0 - self.alpha) / (self.ring_area() * dims.z) * (-xr).exp();
        }
        w
    }

    fn reference_volume(&self, _dims: &Vec3) -> Real {
        1.0
    }

    fn support(&self, dims: &Vec3) -> Vec3 {
        let h = self.spot_radius.max(self.ring_radius + self.ring_half_width);
        vec3(h.max(dims.x), h.max(dims.y), dims.z)
    }

    fn resolution_scale(&self, dims: &Vec3) -> Real {
        self.spot_scale().min(self.ring_scale()).min(dims.z)
    }
}
