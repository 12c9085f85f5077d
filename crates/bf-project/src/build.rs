//! Runtime objects built from a validated case.
//!
//! Model tags are resolved here, once, into their enum selectors. Errors name
//! the offending source.

use std::fmt::Display;
use std::path::Path as FsPath;

use bf_core::{Real, vec3};
use bf_deposition::{
    DepositionIntegrator, DepositionSettings, RefinementController, Source, UniformIntervals,
};
use bf_mesh::{CartesianMesh, Communicator, Mesh};
use bf_path::{Beam, BeamSettings, Path};
use bf_sources::spot_ring::PRESET_RING_RADIUS;
use bf_sources::{
    AbsorptionKind, AbsorptionModel, CavityGeometry, HeatSource, ModifiedSuperGaussian,
    ProjectedGaussian, ShapeKind, ShapeModel, SpotRing, SuperGaussian, TransientDepth,
};
use tracing::info;

use crate::schema::{Case, MeshDef, RefinementDef, SourceDef, SpotRingDef};
use crate::{ProjectError, ProjectResult};

/// Wrap a lower-level error with the name of the source it came from.
fn in_source<E: Display>(source: &SourceDef) -> impl FnOnce(E) -> ProjectError + '_ {
    move |e| ProjectError::Source {
        source_name: source.name.clone(),
        message: e.to_string(),
    }
}

fn require(source: &SourceDef, value: Option<Real>, name: &'static str) -> ProjectResult<Real> {
    value.ok_or_else(|| ProjectError::MissingCoefficient {
        source_name: source.name.clone(),
        name,
    })
}

pub fn build_absorption(source: &SourceDef) -> ProjectResult<AbsorptionModel> {
    let def = &source.absorption;
    let kind: AbsorptionKind = def.model.parse().map_err(|_| ProjectError::UnknownModel {
        source_name: source.name.clone(),
        kind: "absorption",
        tag: def.model.clone(),
    })?;
    let model = match kind {
        AbsorptionKind::Constant => {
            AbsorptionModel::constant(require(source, def.eta, "absorption.eta")?)
        }
        AbsorptionKind::Kelly => {
            let tag = def.geometry.as_deref().ok_or_else(|| ProjectError::MissingCoefficient {
                source_name: source.name.clone(),
                name: "absorption.geometry",
            })?;
            let geometry: CavityGeometry = tag.parse().map_err(in_source(source))?;
            AbsorptionModel::kelly(
                geometry,
                require(source, def.eta0, "absorption.eta0")?,
                require(source, def.eta_min, "absorption.eta_min")?,
            )
        }
    };
    model.map_err(in_source(source))
}

fn build_spot_ring(
    source: &SourceDef,
    def: &SpotRingDef,
    dimensions: &mut [Real; 3],
) -> ProjectResult<SpotRing> {
    let spot = (def.spot_k, def.spot_m);
    let ring = (def.ring_k, def.ring_m);
    if let Some(mode) = def.preset {
        let shape = SpotRing::preset(mode, spot, ring).map_err(in_source(source))?;
        let half = SpotRing::preset_half_width(mode).map_err(in_source(source))?;
        dimensions[0] = half;
        dimensions[1] = half;
        return Ok(shape);
    }
    let shape = SpotRing {
        alpha: require(source, def.alpha, "heat_source.spot_ring.alpha")?,
        spot_radius: require(source, def.spot_radius_m, "heat_source.spot_ring.spot_radius_m")?,
        spot_k: def.spot_k,
        spot_m: def.spot_m,
        ring_radius: def.ring_radius_m.unwrap_or(PRESET_RING_RADIUS),
        ring_half_width: require(
            source,
            def.ring_half_width_m,
            "heat_source.spot_ring.ring_half_width_m",
        )?,
        ring_k: def.ring_k,
        ring_m: def.ring_m,
    };
    shape.validate().map_err(in_source(source))?;
    Ok(shape)
}

pub fn build_heat_source(source: &SourceDef) -> ProjectResult<HeatSource> {
    let def = &source.heat_source;
    let kind: ShapeKind = def.model.parse().map_err(|_| ProjectError::UnknownModel {
        source_name: source.name.clone(),
        kind: "heat_source",
        tag: def.model.clone(),
    })?;

    let mut dimensions = def.dimensions_m;
    let shape: ShapeModel = match kind {
        ShapeKind::SuperGaussian => SuperGaussian::new(require(source, def.k, "heat_source.k")?)
            .map_err(in_source(source))?
            .into(),
        ShapeKind::ModifiedSuperGaussian => ModifiedSuperGaussian::new(
            require(source, def.k, "heat_source.k")?,
            require(source, def.m, "heat_source.m")?,
        )
        .map_err(in_source(source))?
        .into(),
        ShapeKind::ProjectedGaussian => ProjectedGaussian::new(
            require(source, def.a, "heat_source.a")?,
            require(source, def.b, "heat_source.b")?,
        )
        .map_err(in_source(source))?
        .into(),
        ShapeKind::SpotRing => {
            let coeffs = def
                .spot_ring
                .as_ref()
                .ok_or_else(|| ProjectError::MissingCoefficient {
                    source_name: source.name.clone(),
                    name: "heat_source.spot_ring",
                })?;
            build_spot_ring(source, coeffs, &mut dimensions)?.into()
        }
    };

    let [x, y, z] = dimensions;
    let mut heat_source = HeatSource::new(shape, vec3(x, y, z)).map_err(in_source(source))?;
    if def.transient {
        let transient = TransientDepth {
            iso_value: require(source, def.iso_value_k, "heat_source.iso_value_k")?,
            search_radius: def.search_radius_m,
        };
        heat_source = heat_source
            .with_transient(transient)
            .map_err(in_source(source))?;
    }
    Ok(heat_source)
}

pub fn build_beam(case: &Case, source: &SourceDef, case_dir: &FsPath) -> ProjectResult<Beam> {
    let file = case_dir.join(&source.path_file);
    let path = Path::read(&file, case.end_time_s).map_err(in_source(source))?;
    let settings = BeamSettings {
        delta_t: source.delta_t_s.unwrap_or(Real::INFINITY),
        hit_path_intervals: source.hit_path_intervals,
        eps: case.deposition.eps,
        step_dilation: case.deposition.step_dilation,
    };
    Beam::new(path, settings).map_err(in_source(source))
}

/// Source without scan patch handling; see [`build_sources`].
pub fn build_source(case: &Case, source: &SourceDef, case_dir: &FsPath) -> ProjectResult<Source> {
    let beam = build_beam(case, source, case_dir)?;
    let heat_source = build_heat_source(source)?;
    let absorption = build_absorption(source)?;
    info!(
        source = %source.name,
        shape = %heat_source.shape().kind(),
        absorption = absorption.kind().tag(),
        segments = beam.path().len(),
        end_time = beam.end_time(),
        "built heat source"
    );
    Ok(Source::new(source.name.clone(), beam, heat_source, absorption).with_normalize(source.normalize))
}

/// Every source of `case`, with scan patch boundaries gathered from `mesh`.
///
/// Collective when any source names a scan patch.
pub fn build_sources(
    case: &Case,
    case_dir: &FsPath,
    mesh: &dyn Mesh,
    comm: &dyn Communicator,
) -> ProjectResult<Vec<Source>> {
    case.sources
        .iter()
        .map(|def| {
            let source = build_source(case, def, case_dir)?;
            match &def.scan_patch {
                Some(patch) => Ok(source.with_scan_patch(mesh, comm, patch)?),
                None => Ok(source),
            }
        })
        .collect()
}

pub fn build_settings(case: &Case) -> DepositionSettings {
    let def = &case.deposition;
    DepositionSettings {
        cull_factor: def.cull_factor,
        samples_per_scale: def.samples_per_scale,
        max_samples_per_axis: def.max_samples_per_axis,
        correction_tolerance: def.correction_tolerance,
        eps: def.eps,
    }
}

pub fn build_integrator(case: &Case) -> ProjectResult<DepositionIntegrator> {
    Ok(DepositionIntegrator::new(build_settings(case))?)
}

pub fn build_refinement(case: &Case, sources: &[Source]) -> ProjectResult<RefinementController> {
    Ok(match &case.refinement {
        None | Some(RefinementDef::None) => RefinementController::None,
        Some(RefinementDef::UniformIntervals {
            intervals,
            n_levels,
        }) => RefinementController::UniformIntervals(UniformIntervals::new(
            *intervals,
            *n_levels,
            sources,
            case.end_time_s,
        )?),
    })
}

pub fn build_mesh(def: &MeshDef) -> ProjectResult<CartesianMesh> {
    let [x0, y0, z0] = def.min_m;
    let [x1, y1, z1] = def.max_m;
    Ok(CartesianMesh::uniform(
        vec3(x0, y0, z0),
        vec3(x1, y1, z1),
        def.cells,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::single_track;

    #[test]
    fn unknown_absorption_tag_names_source() {
        let mut case = single_track();
        case.sources[0].absorption.model = "fresnel".to_string();
        let err = build_absorption(&case.sources[0]).unwrap_err();
        assert!(matches!(
            &err,
            ProjectError::UnknownModel { kind: "absorption", tag, .. } if tag == "fresnel"
        ));
        assert!(err.to_string().contains("beam0"));
    }

    #[test]
    fn unknown_geometry_is_fatal() {
        let mut case = single_track();
        case.sources[0].absorption.model = "kelly".to_string();
        case.sources[0].absorption.geometry = Some("sphere".to_string());
        case.sources[0].absorption.eta0 = Some(0.3);
        case.sources[0].absorption.eta_min = Some(0.3);
        let err = build_absorption(&case.sources[0]).unwrap_err().to_string();
        assert!(err.contains("sphere") && err.contains("beam0"));
    }

    #[test]
    fn unknown_shape_tag() {
        let mut case = single_track();
        case.sources[0].heat_source.model = "top_hat".to_string();
        assert!(matches!(
            build_heat_source(&case.sources[0]),
            Err(ProjectError::UnknownModel { kind: "heat_source", .. })
        ));
    }

    #[test]
    fn missing_coefficient() {
        let mut case = single_track();
        case.sources[0].heat_source.k = None;
        assert!(matches!(
            build_heat_source(&case.sources[0]),
            Err(ProjectError::MissingCoefficient { name: "heat_source.k", .. })
        ));
    }

    #[test]
    fn spot_ring_preset_sets_horizontal_dimensions() {
        let mut case = single_track();
        let def = &mut case.sources[0].heat_source;
        def.model = "spot_ring".to_string();
        def.spot_ring = Some(SpotRingDef {
            preset: Some(3),
            alpha: None,
            spot_radius_m: None,
            spot_k: 2.0,
            spot_m: 2.0,
            ring_radius_m: None,
            ring_half_width_m: None,
            ring_k: 2.0,
            ring_m: 2.0,
        });
        let heat_source = build_heat_source(&case.sources[0]).unwrap();
        let half = SpotRing::preset_half_width(3).unwrap();
        assert_eq!(heat_source.dimensions().x, half);
        assert_eq!(heat_source.dimensions().y, half);
        assert_eq!(heat_source.dimensions().z, case.sources[0].heat_source.dimensions_m[2]);
    }

    #[test]
    fn settings_follow_case() {
        let mut case = single_track();
        case.deposition.cull_factor = 2.5;
        case.deposition.correction_tolerance = 0.02;
        let settings = build_settings(&case);
        assert_eq!(settings.cull_factor, 2.5);
        assert_eq!(settings.correction_tolerance, 0.02);
        assert!(build_integrator(&case).is_ok());
    }

    #[test]
    fn missing_scan_path_names_source_and_file() {
        let case = single_track();
        let dir = std::env::temp_dir().join("bf_project_missing_scan_path");
        let err = build_beam(&case, &case.sources[0], &dir).unwrap_err().to_string();
        assert!(err.contains("beam0"));
        assert!(err.contains(&case.sources[0].path_file));
    }
}
