//! bf-mesh: the mesh and communication seam for the deposition engine.
//!
//! Provides:
//! - `Mesh` trait: the cell geometry a heat source is deposited onto
//! - `CartesianMesh`: rectilinear hex mesh with slab partitioning
//! - `CellList`: explicit cells of arbitrary shape
//! - `Communicator`: collective reductions (serial and in-process threads)
//! - `TemperatureField` and isotherm crossing search
//!
//! # Example
//!
//! ```
//! use bf_core::vec3;
//! use bf_mesh::{CartesianMesh, Mesh};
//!
//! let mesh = CartesianMesh::uniform(vec3(0.0, 0.0, -1.0), vec3(2.0, 1.0, 0.0), [4, 2, 2]).unwrap();
//! assert_eq!(mesh.n_cells(), 16);
//! assert!((mesh.volume(0) - 0.125).abs() < 1e-12);
//! ```

pub mod cartesian;
pub mod comm;
pub mod error;
pub mod field;
pub mod isotherm;
pub mod mesh;

pub use cartesian::CartesianMesh;
pub use comm::{Communicator, SerialComm, ThreadComm};
pub use error::{MeshError, MeshResult};
pub use field::TemperatureField;
pub use isotherm::iso_points;
pub use mesh::{CellGeometry, CellList, CoupledFace, Mesh};
