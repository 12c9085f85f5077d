//! Absorption efficiency as a function of melt-pool aspect ratio.

use std::fmt;
use std::str::FromStr;

use crate::error::{SourceError, SourceResult};
use bf_core::Real;

/// Idealised keyhole cavity used for the multiple-reflection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CavityGeometry {
    Cone,
    Cylinder,
}

impl CavityGeometry {
    pub fn tag(self) -> &'static str {
        match self {
            CavityGeometry::Cone => "cone",
            CavityGeometry::Cylinder => "cylinder",
        }
    }
}

impl FromStr for CavityGeometry {
    type Err = SourceError;

    fn from_str(tag: &str) -> SourceResult<Self> {
        match tag {
            "cone" => Ok(CavityGeometry::Cone),
            "cylinder" => Ok(CavityGeometry::Cylinder),
            _ => Err(SourceError::UnknownGeometry {
                tag: tag.to_string(),
            }),
        }
    }
}

/// Absorption model family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorptionKind {
    Constant,
    Kelly,
}

impl AbsorptionKind {
    pub fn tag(self) -> &'static str {
        match self {
            AbsorptionKind::Constant => "constant",
            AbsorptionKind::Kelly => "kelly",
        }
    }
}

impl FromStr for AbsorptionKind {
    type Err = SourceError;

    fn from_str(tag: &str) -> SourceResult<Self> {
        match tag {
            "constant" => Ok(AbsorptionKind::Constant),
            "kelly" => Ok(AbsorptionKind::Kelly),
            _ => Err(SourceError::UnknownAbsorption {
                tag: tag.to_string(),
            }),
        }
    }
}

impl fmt::Display for AbsorptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fraction of beam power absorbed by the material.
#[derive(Debug, Clone, PartialEq)]
pub enum AbsorptionModel {
    /// Fixed efficiency.
    Constant { eta: Real },
    /// Multiple reflections inside a keyhole cavity: single-bounce
    /// absorptivity `eta0` is enhanced by closed-form view factors once the
    /// aspect ratio exceeds one. Shallower pools absorb `eta_min`.
    Kelly {
        geometry: CavityGeometry,
        eta0: Real,
        eta_min: Real,
    },
}

fn check_fraction(v: Real, what: &'static str) -> SourceResult<Real> {
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(SourceError::InvalidParameter { what })
    }
}

impl AbsorptionModel {
    pub fn constant(eta: Real) -> SourceResult<Self> {
        Ok(AbsorptionModel::Constant {
            eta: check_fraction(eta, "absorption eta must be in [0, 1]")?,
        })
    }

    pub fn kelly(geometry: CavityGeometry, eta0: Real, eta_min: Real) -> SourceResult<Self> {
        Ok(AbsorptionModel::Kelly {
            geometry,
            eta0: check_fraction(eta0, "absorption eta0 must be in [0, 1]")?,
            eta_min: check_fraction(eta_min, "absorption eta_min must be in [0, 1]")?,
        })
    }

    pub fn kind(&self) -> AbsorptionKind {
        match self {
            AbsorptionModel::Constant { .. } => AbsorptionKind::Constant,
            AbsorptionModel::Kelly { .. } => AbsorptionKind::Kelly,
        }
    }

    /// Absorbed fraction for a pool of the given depth / half-width ratio.
    pub fn eta(&self, aspect_ratio: Real) -> Real {
        let eta = match *self {
            AbsorptionModel::Constant { eta } => eta,
            AbsorptionModel::Kelly {
                geometry,
                eta0,
                eta_min,
            } => {
                if aspect_ratio > 1.0 {
                    let theta = (1.0 / aspect_ratio).atan();
                    let (f, g) = match geometry {
                        CavityGeometry::Cone => (
                            0.25 * (3.0 * theta.sin() - (3.0 * theta).sin()),
                            1.0 / (1.0 + (1.0 + aspect_ratio * aspect_ratio).sqrt()),
                        ),
                        CavityGeometry::Cylinder => (
                            0.5 * (1.0 - (2.0 * theta).cos()),
                            0.5 / (1.0 + aspect_ratio),
                        ),
                    };
                    eta0 * (1.0 + (1.0 - eta0) * (g - f)) / (1.0 - (1.0 - eta0) * (1.0 - g))
                } else {
                    eta_min
                }
            }
        };
        if eta.is_finite() { eta.clamp(0.0, 1.0) } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn constant_ignores_aspect_ratio() {
        let model = AbsorptionModel::constant(0.35).unwrap();
        assert_eq!(model.eta(0.1), 0.35);
        assert_eq!(model.eta(12.0), 0.35);
    }

    #[test]
    fn kelly_floor_for_shallow_pools() {
        let model = AbsorptionModel::kelly(CavityGeometry::Cone, 0.3, 0.25).unwrap();
        assert_eq!(model.eta(0.5), 0.25);
        assert_eq!(model.eta(1.0), 0.25);
    }

    #[test]
    fn kelly_cylinder_reference_value() {
        let model = AbsorptionModel::kelly(CavityGeometry::Cylinder, 0.3, 0.3).unwrap();
        assert_relative_eq!(model.eta(2.0), 0.7032, max_relative = 1e-12);
    }

    #[test]
    fn kelly_cone_reference_value() {
        let model = AbsorptionModel::kelly(CavityGeometry::Cone, 0.3, 0.3).unwrap();
        assert_relative_eq!(model.eta(2.0), 0.670_351_778_541_76, max_relative = 1e-10);
    }

    #[test]
    fn deep_keyhole_absorbs_nearly_everything() {
        for geometry in [CavityGeometry::Cone, CavityGeometry::Cylinder] {
            let model = AbsorptionModel::kelly(geometry, 0.3, 0.3).unwrap();
            assert!(model.eta(100.0) > 0.98);
        }
    }

    #[test]
    fn unknown_geometry_is_rejected() {
        let err = "sphere".parse::<CavityGeometry>().unwrap_err();
        assert_eq!(
            err,
            SourceError::UnknownGeometry {
                tag: "sphere".into()
            }
        );
        assert!("gaussian".parse::<AbsorptionKind>().is_err());
        assert_eq!("kelly".parse::<AbsorptionKind>(), Ok(AbsorptionKind::Kelly));
    }

    #[test]
    fn out_of_range_eta_is_rejected() {
        assert!(AbsorptionModel::constant(1.2).is_err());
        assert!(AbsorptionModel::kelly(CavityGeometry::Cone, -0.1, 0.2).is_err());
    }

    proptest! {
        #[test]
        fn eta_is_a_fraction(
            eta0 in 0.0f64..=1.0,
            eta_min in 0.0f64..=1.0,
            ar in 0.0f64..1000.0,
            cone in any::<bool>(),
        ) {
            let geometry = if cone { CavityGeometry::Cone } else { CavityGeometry::Cylinder };
            let model = AbsorptionModel::kelly(geometry, eta0, eta_min).unwrap();
            let eta = model.eta(ar);
            prop_assert!((0.0..=1.0).contains(&eta));
        }

        #[test]
        fn kelly_grows_with_aspect_ratio(
            eta0 in 0.05f64..0.95,
            ar in 1.01f64..50.0,
            cone in any::<bool>(),
        ) {
            let geometry = if cone { CavityGeometry::Cone } else { CavityGeometry::Cylinder };
            let model = AbsorptionModel::kelly(geometry, eta0, 0.0).unwrap();
            prop_assert!(model.eta(ar * 1.5) >= model.eta(ar) - 1e-12);
        }
    }
}
