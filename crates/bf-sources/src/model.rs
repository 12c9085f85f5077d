//! Tagged dispatch over the heat source distributions.

use std::fmt;
use std::str::FromStr;

use crate::error::{SourceError, SourceResult};
use crate::modified_super_gaussian::ModifiedSuperGaussian;
use crate::projected_gaussian::ProjectedGaussian;
use crate::spot_ring::SpotRing;
use crate::super_gaussian::SuperGaussian;
use crate::traits::HeatSourceShape;
use bf_core::{Real, Vec3};

/// Distribution family selector, resolved once from a case file tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    SuperGaussian,
    ModifiedSuperGaussian,
    ProjectedGaussian,
    SpotRing,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::SuperGaussian,
        ShapeKind::ModifiedSuperGaussian,
        ShapeKind::ProjectedGaussian,
        ShapeKind::SpotRing,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::SuperGaussian => "super_gaussian",
            ShapeKind::ModifiedSuperGaussian => "modified_super_gaussian",
            ShapeKind::ProjectedGaussian => "projected_gaussian",
            ShapeKind::SpotRing => "spot_ring",
        }
    }
}

impl FromStr for ShapeKind {
    type Err = SourceError;

    fn from_str(tag: &str) -> SourceResult<Self> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| SourceError::UnknownShape {
                tag: tag.to_string(),
            })
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One of the supported distributions.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeModel {
    SuperGaussian(SuperGaussian),
    ModifiedSuperGaussian(ModifiedSuperGaussian),
    ProjectedGaussian(ProjectedGaussian),
    SpotRing(SpotRing),
}

impl ShapeModel {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeModel::SuperGaussian(_) => ShapeKind::SuperGaussian,
            ShapeModel::ModifiedSuperGaussian(_) => ShapeKind::ModifiedSuperGaussian,
            ShapeModel::ProjectedGaussian(_) => ShapeKind::ProjectedGaussian,
            ShapeModel::SpotRing(_) => ShapeKind::SpotRing,
        }
    }

    fn inner(&self) -> &dyn HeatSourceShape {
        match self {
            ShapeModel::SuperGaussian(s) => s,
            ShapeModel::ModifiedSuperGaussian(s) => s,
            ShapeModel::ProjectedGaussian(s) => s,
            ShapeModel::SpotRing(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn HeatSourceShape {
        match self {
            ShapeModel::SuperGaussian(s) => s,
            ShapeModel::ModifiedSuperGaussian(s) => s,
            ShapeModel::ProjectedGaussian(s) => s,
            ShapeModel::SpotRing(s) => s,
        }
    }
}

impl HeatSourceShape for ShapeModel {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn weight(&self, d: &Vec3, dims: &Vec3) -> Real {
        self.inner().weight(d, dims)
    }

    fn reference_volume(&self, dims: &Vec3) -> Real {
        self.inner().reference_volume(dims)
    }

    fn support(&self, dims: &Vec3) -> Vec3 {
        self.inner().support(dims)
    }

    fn resolution_scale(&self, dims: &Vec3) -> Real {
        self.inner().resolution_scale(dims)
    }

    fn on_dimensions_changed(&mut self, dims: &Vec3, static_dims: &Vec3) {
        self.inner_mut().on_dimensions_changed(dims, static_dims);
    }
}

impl From<SuperGaussian> for ShapeModel {
    fn from(s: SuperGaussian) -> Self {
        ShapeModel::SuperGaussian(s)
    }
}

impl From<ModifiedSuperGaussian> for ShapeModel {
    fn from(s: ModifiedSuperGaussian) -> Self {
        ShapeModel::ModifiedSuperGaussian(s)
    }
}

impl From<ProjectedGaussian> for ShapeModel {
    fn from(s: ProjectedGaussian) -> Self {
        ShapeModel::ProjectedGaussian(s)
    }
}

impl From<SpotRing> for ShapeModel {
    fn from(s: SpotRing) -> Self {
        ShapeModel::SpotRing(s)
    }
}
