//! bf-project: case file format, validation and runtime construction.

pub mod build;
pub mod migrate;
pub mod run;
pub mod schema;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use build::{
    build_absorption, build_beam, build_heat_source, build_integrator, build_mesh,
    build_refinement, build_settings, build_source, build_sources,
};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use run::{RunOptions, RunSummary, SourceEnergy, run_case};
pub use schema::*;
pub use validate::{ValidationError, validate_case};

use bf_deposition::DepositionError;
use bf_mesh::MeshError;
use bf_path::PathError;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Heat source '{source_name}': unknown {kind} model '{tag}'")]
    UnknownModel {
        source_name: String,
        kind: &'static str,
        tag: String,
    },

    #[error("Heat source '{source_name}': missing coefficient {name}")]
    MissingCoefficient {
        source_name: String,
        name: &'static str,
    },

    #[error("Heat source '{source_name}': {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("Deposition error: {message}")]
    Deposition { message: String },

    #[error("Mesh error: {message}")]
    Mesh { message: String },

    #[error("Scan path error: {message}")]
    Path { message: String },

    #[error("Run failed: {what}")]
    Run { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DepositionError> for ProjectError {
    fn from(e: DepositionError) -> Self {
        ProjectError::Deposition {
            message: e.to_string(),
        }
    }
}

impl From<MeshError> for ProjectError {
    fn from(e: MeshError) -> Self {
        ProjectError::Mesh {
            message: e.to_string(),
        }
    }
}

impl From<PathError> for ProjectError {
    fn from(e: PathError) -> Self {
        ProjectError::Path {
            message: e.to_string(),
        }
    }
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Case> {
    let content = std::fs::read_to_string(path)?;
    let mut case: Case = serde_yaml::from_str(&content)?;
    case = migrate_to_latest(case)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn save_yaml(path: &std::path::Path, case: &Case) -> ProjectResult<()> {
    validate_case(case)?;
    let content = serde_yaml::to_string(case)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Case> {
    let content = std::fs::read_to_string(path)?;
    let mut case: Case = serde_json::from_str(&content)?;
    case = migrate_to_latest(case)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn save_json(path: &std::path::Path, case: &Case) -> ProjectResult<()> {
    validate_case(case)?;
    let content = serde_json::to_string_pretty(case)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a case by extension: `.json` as JSON, anything else as YAML.
pub fn load_case(path: &std::path::Path) -> ProjectResult<Case> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
