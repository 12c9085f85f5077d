//! Heat source dimensions and transient depth tracking.

use bf_core::{Real, Vec3};
use bf_mesh::{Communicator, Mesh, TemperatureField, iso_points};
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::model::ShapeModel;
use crate::traits::HeatSourceShape;

/// Melt-pool depth tracking from an isotherm of the live temperature field.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientDepth {
    /// Isotherm defining the pool boundary (K).
    pub iso_value: Real,
    /// Horizontal search radius around the beam centre (m). Defaults to 1.5x
    /// the larger static half-width.
    pub search_radius: Option<Real>,
}

/// A distribution together with its current and baseline dimensions.
#[derive(Debug, Clone)]
pub struct HeatSource {
    shape: ShapeModel,
    dimensions: Vec3,
    static_dimensions: Vec3,
    transient: Option<TransientDepth>,
}

impl HeatSource {
    pub fn new(shape: ShapeModel, dimensions: Vec3) -> SourceResult<Self> {
        if dimensions.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(SourceError::InvalidParameter {
                what: "heat source dimensions must be positive",
            });
        }
        let mut source = Self {
            shape,
            dimensions,
            static_dimensions: dimensions,
            transient: None,
        };
        source.shape.on_dimensions_changed(&dimensions, &dimensions);
        Ok(source)
    }

    pub fn with_transient(mut self, transient: TransientDepth) -> SourceResult<Self> {
        if !transient.iso_value.is_finite() {
            return Err(SourceError::InvalidParameter {
                what: "transient iso value must be finite",
            });
        }
        if let Some(r) = transient.search_radius {
            if !r.is_finite() || r <= 0.0 {
                return Err(SourceError::InvalidParameter {
                    what: "transient search radius must be positive",
                });
            }
        }
        self.transient = Some(transient);
        Ok(self)
    }

    pub fn shape(&self) -> &ShapeModel {
        &self.shape
    }

    /// Current half-widths (x, y) and depth (z).
    pub fn dimensions(&self) -> &Vec3 {
        &self.dimensions
    }

    pub fn static_dimensions(&self) -> &Vec3 {
        &self.static_dimensions
    }

    pub fn transient(&self) -> Option<&TransientDepth> {
        self.transient.as_ref()
    }

    /// Depth over the smaller horizontal half-width.
    pub fn aspect_ratio(&self) -> Real {
        self.dimensions.z / self.dimensions.x.min(self.dimensions.y)
    }

    pub fn weight(&self, d: &Vec3) -> Real {
        self.shape.weight(d, &self.dimensions)
    }

    pub fn reference_volume(&self) -> Real {
        self.shape.reference_volume(&self.dimensions)
    }

    pub fn support(&self) -> Vec3 {
        self.shape.support(&self.dimensions)
    }

    pub fn resolution_scale(&self) -> Real {
        self.shape.resolution_scale(&self.dimensions)
    }

    pub fn search_radius(&self) -> Real {
        self.transient
            .as_ref()
            .and_then(|t| t.search_radius)
            .unwrap_or(1.5 * self.static_dimensions.x.max(self.static_dimensions.y))
    }

    /// Set the depth from the deepest isotherm crossing near `centre`.
    ///
    /// Collective: every rank must call this for every source with tracking
    /// enabled, whether or not it owns cells near the beam. A no-op without
    /// tracking. Returns the new depth.
    pub fn update_depth(
        &mut self,
        mesh: &dyn Mesh,
        comm: &dyn Communicator,
        temperature: &TemperatureField,
        centre: &Vec3,
    ) -> SourceResult<Real> {
        let Some(transient) = &self.transient else {
            return Ok(self.dimensions.z);
        };
        temperature.check(mesh)?;

        let radius = self.search_radius();
        let local = iso_points(mesh, temperature, transient.iso_value)
            .iter()
            .filter(|p| (p.x - centre.x).hypot(p.y - centre.y) <= radius)
            .map(|p| centre.z - p.z)
            .fold(0.0, Real::max);
        let observed = comm.all_reduce_max(local);

        self.dimensions.z = observed.max(self.static_dimensions.z);
        let (dims, static_dims) = (self.dimensions, self.static_dimensions);
        self.shape.on_dimensions_changed(&dims, &static_dims);
        debug!(
            shape = self.shape.name(),
            observed,
            depth = self.dimensions.z,
            "updated transient depth"
        );
        Ok(self.dimensions.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProjectedGaussian, SuperGaussian};
    use approx::assert_relative_eq;
    use bf_core::vec3;
    use bf_mesh::{CartesianMesh, SerialComm};

    fn column() -> CartesianMesh {
        CartesianMesh::uniform(vec3(-1.0, -1.0, -4.0), vec3(1.0, 1.0, 0.0), [2, 2, 8]).unwrap()
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let shape: ShapeModel = SuperGaussian::new(2.0).unwrap().into();
        assert!(HeatSource::new(shape, vec3(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn aspect_ratio_uses_smaller_half_width() {
        let shape: ShapeModel = SuperGaussian::new(2.0).unwrap().into();
        let source = HeatSource::new(shape, vec3(2.0, 1.0, 3.0)).unwrap();
        assert_eq!(source.aspect_ratio(), 3.0);
        assert_eq!(source.search_radius(), 3.0);
    }

    #[test]
    fn depth_follows_isotherm() {
        let mesh = column();
        // Melt pool 2.2 deep at the axis.
        let field = TemperatureField::from_fn(&mesh, |p| 1000.0 + 500.0 * (p.z + 2.2));
        let shape: ShapeModel = ProjectedGaussian::new(1.0, 1.0).unwrap().into();
        let mut source = HeatSource::new(shape, vec3(1.0, 1.0, 0.5))
            .unwrap()
            .with_transient(TransientDepth {
                iso_value: 1000.0,
                search_radius: None,
            })
            .unwrap();

        let depth = source
            .update_depth(&mesh, &SerialComm, &field, &Vec3::zeros())
            .unwrap();
        assert_relative_eq!(depth, 2.2, epsilon = 1e-12);
        assert_eq!(source.static_dimensions().z, 0.5);
        // Shape refreshed: k = 2^(log2(2.2) + 1).
        let ShapeModel::ProjectedGaussian(pg) = source.shape() else {
            panic!("shape changed kind");
        };
        assert_relative_eq!(pg.k(), 4.4, max_relative = 1e-12);
    }

    #[test]
    fn depth_never_below_static() {
        let mesh = column();
        let field = TemperatureField::uniform(&mesh, 300.0);
        let shape: ShapeModel = SuperGaussian::new(2.0).unwrap().into();
        let mut source = HeatSource::new(shape, vec3(1.0, 1.0, 0.5))
            .unwrap()
            .with_transient(TransientDepth {
                iso_value: 1000.0,
                search_radius: Some(0.5),
            })
            .unwrap();
        let depth = source
            .update_depth(&mesh, &SerialComm, &field, &Vec3::zeros())
            .unwrap();
        assert_eq!(depth, 0.5);
    }

    #[test]
    fn crossings_outside_radius_ignored() {
        let mesh = column();
        // Hot only far from the beam axis (x > 0).
        let field = TemperatureField::from_fn(&mesh, |p| {
            if p.x > 0.0 { 1000.0 + 500.0 * (p.z + 3.0) } else { 300.0 }
        });
        let shape: ShapeModel = SuperGaussian::new(2.0).unwrap().into();
        let mut source = HeatSource::new(shape, vec3(0.1, 0.1, 0.5))
            .unwrap()
            .with_transient(TransientDepth {
                iso_value: 1000.0,
                search_radius: None,
            })
            .unwrap();
        let far = vec3(-5.0, 0.0, 0.0);
        let depth = source
            .update_depth(&mesh, &SerialComm, &field, &far)
            .unwrap();
        assert_eq!(depth, 0.5);
    }

    #[test]
    fn static_source_skips_tracking() {
        let mesh = column();
        let field = TemperatureField::uniform(&mesh, 5000.0);
        let shape: ShapeModel = SuperGaussian::new(2.0).unwrap().into();
        let mut source = HeatSource::new(shape, vec3(1.0, 1.0, 0.5)).unwrap();
        let depth = source
            .update_depth(&mesh, &SerialComm, &field, &Vec3::zeros())
            .unwrap();
        assert_eq!(depth, 0.5);
    }
}
