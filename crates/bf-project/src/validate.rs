//! Case validation logic.

use std::collections::HashSet;
use std::fmt::Display;

use crate::schema::{
    AbsorptionDef, Case, DepositionDef, HeatSourceDef, MeshDef, RefinementDef, RunDef, SourceDef,
    SpotRingDef,
};
use bf_sources::spot_ring::PRESET_COUNT;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing value: {field} ({reason})")]
    MissingValue { field: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl Display, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

fn fraction(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value, "must be in [0, 1]"))
    }
}

pub fn validate_case(case: &Case) -> Result<(), ValidationError> {
    if case.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }
    positive("end_time_s", case.end_time_s)?;

    if case.sources.is_empty() {
        return Err(ValidationError::MissingValue {
            field: "sources".to_string(),
            reason: "at least one heat source is required".to_string(),
        });
    }
    let mut names = HashSet::new();
    for source in &case.sources {
        if !names.insert(&source.name) {
            return Err(ValidationError::DuplicateId {
                id: source.name.clone(),
                context: "sources".to_string(),
            });
        }
        validate_source(source)?;
    }

    validate_deposition(&case.deposition)?;
    if let Some(refinement) = &case.refinement {
        validate_refinement(refinement)?;
    }
    if let Some(mesh) = &case.mesh {
        validate_mesh(mesh)?;
    }
    if let Some(run) = &case.run {
        validate_run(run, case.mesh.as_ref())?;
    }
    Ok(())
}

fn validate_source(source: &SourceDef) -> Result<(), ValidationError> {
    if source.name.trim().is_empty() {
        return Err(invalid("source name", "''", "must not be empty"));
    }
    let field = |name: &str| format!("source '{}' {}", source.name, name);

    if source.path_file.trim().is_empty() {
        return Err(invalid(field("path_file"), "''", "must not be empty"));
    }
    if let Some(dt) = source.delta_t_s {
        positive(field("delta_t_s"), dt)?;
    }
    if let Some(patch) = &source.scan_patch {
        if patch.trim().is_empty() {
            return Err(invalid(field("scan_patch"), "''", "must not be empty"));
        }
    }
    validate_absorption(&source.absorption, &field)?;
    validate_heat_source(&source.heat_source, &field)
}

fn validate_absorption(
    absorption: &AbsorptionDef,
    field: &dyn Fn(&str) -> String,
) -> Result<(), ValidationError> {
    for (name, value) in [
        ("absorption.eta", absorption.eta),
        ("absorption.eta0", absorption.eta0),
        ("absorption.eta_min", absorption.eta_min),
    ] {
        if let Some(v) = value {
            fraction(field(name), v)?;
        }
    }
    Ok(())
}

fn validate_heat_source(
    heat_source: &HeatSourceDef,
    field: &dyn Fn(&str) -> String,
) -> Result<(), ValidationError> {
    for (axis, value) in ["x", "y", "z"].iter().zip(heat_source.dimensions_m) {
        positive(field(&format!("heat_source.dimensions_m.{axis}")), value)?;
    }
    for (name, value) in [
        ("heat_source.k", heat_source.k),
        ("heat_source.m", heat_source.m),
    ] {
        if let Some(v) = value {
            positive(field(name), v)?;
        }
    }
    for (name, value) in [("heat_source.a", heat_source.a), ("heat_source.b", heat_source.b)] {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(invalid(field(name), v, "must be finite"));
            }
        }
    }
    if let Some(spot_ring) = &heat_source.spot_ring {
        validate_spot_ring(spot_ring, field)?;
    }

    if heat_source.transient {
        match heat_source.iso_value_k {
            Some(iso) if iso.is_finite() => {}
            Some(iso) => return Err(invalid(field("heat_source.iso_value_k"), iso, "must be finite")),
            None => {
                return Err(ValidationError::MissingValue {
                    field: field("heat_source.iso_value_k"),
                    reason: "required when transient is true".to_string(),
                });
            }
        }
    }
    if let Some(radius) = heat_source.search_radius_m {
        positive(field("heat_source.search_radius_m"), radius)?;
    }
    Ok(())
}

fn validate_spot_ring(
    spot_ring: &SpotRingDef,
    field: &dyn Fn(&str) -> String,
) -> Result<(), ValidationError> {
    if let Some(preset) = spot_ring.preset {
        if preset >= PRESET_COUNT {
            return Err(invalid(
                field("heat_source.spot_ring.preset"),
                preset,
                "beam-shaping preset must be 0 to 6",
            ));
        }
    }
    if let Some(alpha) = spot_ring.alpha {
        fraction(field("heat_source.spot_ring.alpha"), alpha)?;
    }
    for (name, value) in [
        ("heat_source.spot_ring.spot_k", spot_ring.spot_k),
        ("heat_source.spot_ring.spot_m", spot_ring.spot_m),
        ("heat_source.spot_ring.ring_k", spot_ring.ring_k),
        ("heat_source.spot_ring.ring_m", spot_ring.ring_m),
    ] {
        positive(field(name), value)?;
    }
    for (name, value) in [
        ("heat_source.spot_ring.spot_radius_m", spot_ring.spot_radius_m),
        ("heat_source.spot_ring.ring_radius_m", spot_ring.ring_radius_m),
        ("heat_source.spot_ring.ring_half_width_m", spot_ring.ring_half_width_m),
    ] {
        if let Some(v) = value {
            positive(field(name), v)?;
        }
    }
    Ok(())
}

fn validate_deposition(deposition: &DepositionDef) -> Result<(), ValidationError> {
    if !(1.5..=3.0).contains(&deposition.cull_factor) {
        return Err(invalid(
            "deposition.cull_factor",
            deposition.cull_factor,
            "must be in [1.5, 3]",
        ));
    }
    if deposition.samples_per_scale == 0 {
        return Err(invalid("deposition.samples_per_scale", 0, "must be positive"));
    }
    if deposition.max_samples_per_axis == 0 {
        return Err(invalid("deposition.max_samples_per_axis", 0, "must be positive"));
    }
    if !(0.0..1.0).contains(&deposition.correction_tolerance) {
        return Err(invalid(
            "deposition.correction_tolerance",
            deposition.correction_tolerance,
            "must be in [0, 1)",
        ));
    }
    if !deposition.eps.is_finite() || deposition.eps < 0.0 {
        return Err(invalid("deposition.eps", deposition.eps, "must be non-negative"));
    }
    if !(0.0..1.0).contains(&deposition.step_dilation) {
        return Err(invalid(
            "deposition.step_dilation",
            deposition.step_dilation,
            "must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_refinement(refinement: &RefinementDef) -> Result<(), ValidationError> {
    if let RefinementDef::UniformIntervals {
        intervals,
        n_levels,
    } = refinement
    {
        if *intervals == 0 {
            return Err(invalid("refinement.intervals", intervals, "must be positive"));
        }
        if *n_levels == 0 {
            return Err(invalid("refinement.n_levels", n_levels, "must be positive"));
        }
    }
    Ok(())
}

fn validate_mesh(mesh: &MeshDef) -> Result<(), ValidationError> {
    for axis in 0..3 {
        let (lo, hi) = (mesh.min_m[axis], mesh.max_m[axis]);
        if !lo.is_finite() || !hi.is_finite() || hi <= lo {
            return Err(invalid(
                format!("mesh axis {axis}"),
                format!("[{lo}, {hi}]"),
                "max must exceed min",
            ));
        }
        if mesh.cells[axis] == 0 {
            return Err(invalid(format!("mesh.cells[{axis}]"), 0, "must be positive"));
        }
    }
    Ok(())
}

fn validate_run(run: &RunDef, mesh: Option<&MeshDef>) -> Result<(), ValidationError> {
    positive("run.dt_s", run.dt_s)?;
    if !run.temperature_k.is_finite() {
        return Err(invalid("run.temperature_k", run.temperature_k, "must be finite"));
    }
    if run.ranks == 0 {
        return Err(invalid("run.ranks", 0, "must be positive"));
    }
    if let Some(mesh) = mesh {
        if run.ranks > mesh.cells[0] {
            return Err(invalid(
                "run.ranks",
                run.ranks,
                "cannot exceed the mesh cell count along x",
            ));
        }
    }
    Ok(())
}
