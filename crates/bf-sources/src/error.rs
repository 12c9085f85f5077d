//! Error types for heat source and absorption models.

use bf_mesh::MeshError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Unknown absorption cavity geometry '{tag}' (expected cone or cylinder)")]
    UnknownGeometry { tag: String },

    #[error("Unknown absorption model '{tag}' (expected constant or kelly)")]
    UnknownAbsorption { tag: String },

    #[error(
        "Unknown heat source model '{tag}' (expected super_gaussian, modified_super_gaussian, projected_gaussian or spot_ring)"
    )]
    UnknownShape { tag: String },

    #[error("Unknown beam-shaping preset {mode} (expected 0 to 6)")]
    UnknownPreset { mode: usize },

    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },

    #[error("Mesh error: {message}")]
    Mesh { message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

impl From<MeshError> for SourceError {
    fn from(e: MeshError) -> Self {
        SourceError::Mesh {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_geometry_names_tag() {
        let err = SourceError::UnknownGeometry {
            tag: "sphere".into(),
        };
        assert!(err.to_string().contains("'sphere'"));
    }
}
