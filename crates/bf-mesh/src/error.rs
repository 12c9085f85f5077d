//! Mesh and field error types.

/// Mesh construction and field consistency errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Node coordinates along an axis are missing or not strictly increasing.
    InvalidNodes { axis: &'static str },

    /// More partitions requested than cells along the split axis.
    Partition { cells: usize, ranks: usize },

    /// A field does not match the mesh it is used with.
    FieldSize {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A face references a cell that doesn't exist.
    InvalidCellRef { cell: usize, n_cells: usize },

    InvalidArg { what: &'static str },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::InvalidNodes { axis } => {
                write!(
                    f,
                    "Node coordinates along {} must be finite, strictly increasing and at least two",
                    axis
                )
            }
            MeshError::Partition { cells, ranks } => {
                write!(f, "Cannot split {} cells across {} ranks", cells, ranks)
            }
            MeshError::FieldSize {
                what,
                expected,
                found,
            } => {
                write!(
                    f,
                    "{} has {} entries but the mesh needs {}",
                    what, found, expected
                )
            }
            MeshError::InvalidCellRef { cell, n_cells } => {
                write!(f, "Face references cell {} of {}", cell, n_cells)
            }
            MeshError::InvalidArg { what } => write!(f, "Invalid argument: {}", what),
        }
    }
}

impl std::error::Error for MeshError {}

pub type MeshResult<T> = Result<T, MeshError>;
