//! Integration and correction options.

use bf_core::{PATH_EPS, Real};

use crate::error::{DepositionError, DepositionResult};

/// Options for [`crate::DepositionIntegrator`].
#[derive(Clone, Debug, PartialEq)]
pub struct DepositionSettings {
    /// Culling box half-extent as a multiple of the shape support.
    pub cull_factor: Real,
    /// Sub-samples per resolution length scale along each cell axis.
    pub samples_per_scale: usize,
    /// Upper bound on sub-samples per cell axis.
    pub max_samples_per_axis: usize,
    /// Largest relative mismatch between deposited and absorbed power that is
    /// rescaled away.
    pub correction_tolerance: Real,
    /// Power and time comparison tolerance.
    pub eps: Real,
}

impl Default for DepositionSettings {
    fn default() -> Self {
        Self {
            cull_factor: 2.0,
            samples_per_scale: 4,
            max_samples_per_axis: 8,
            correction_tolerance: 0.05,
            eps: PATH_EPS,
        }
    }
}

impl DepositionSettings {
    pub fn validate(&self) -> DepositionResult<()> {
        if !(1.5..=3.0).contains(&self.cull_factor) {
            return Err(DepositionError::InvalidArg {
                what: "cull_factor must be in [1.5, 3]",
            });
        }
        if self.samples_per_scale == 0 || self.max_samples_per_axis == 0 {
            return Err(DepositionError::InvalidArg {
                what: "sample counts must be positive",
            });
        }
        if !(0.0..1.0).contains(&self.correction_tolerance) {
            return Err(DepositionError::InvalidArg {
                what: "correction_tolerance must be in [0, 1)",
            });
        }
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(DepositionError::InvalidArg {
                what: "eps must be finite and non-negative",
            });
        }
        Ok(())
    }
}
