//! Error types for deposition and sub-cycling.

use bf_mesh::MeshError;
use bf_path::PathError;
use bf_sources::SourceError;
use thiserror::Error;

/// Errors encountered while depositing heat source power onto a mesh.
#[derive(Error, Debug)]
pub enum DepositionError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Heat source '{name}': mesh has no boundary patch '{patch}'")]
    UnknownPatch { name: String, patch: String },

    #[error("Scan path error: {message}")]
    Path { message: String },

    #[error("Heat source model error: {message}")]
    Model { message: String },

    #[error("Mesh error: {message}")]
    Mesh { message: String },
}

pub type DepositionResult<T> = Result<T, DepositionError>;

impl From<PathError> for DepositionError {
    fn from(e: PathError) -> Self {
        DepositionError::Path {
            message: e.to_string(),
        }
    }
}

impl From<SourceError> for DepositionError {
    fn from(e: SourceError) -> Self {
        DepositionError::Model {
            message: e.to_string(),
        }
    }
}

impl From<MeshError> for DepositionError {
    fn from(e: MeshError) -> Self {
        DepositionError::Mesh {
            message: e.to_string(),
        }
    }
}
