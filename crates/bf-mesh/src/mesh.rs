//! Mesh interface and an explicit cell list.

use std::collections::HashMap;

use bf_core::{BoundBox, Real, Vec3};

use crate::error::{MeshError, MeshResult};

/// A face shared with a cell owned by another partition.
#[derive(Debug, Clone, PartialEq)]
pub struct CoupledFace {
    /// Local cell on this side of the face.
    pub owner: usize,
    /// Centre of the remote cell on the other side.
    pub neighbour_centre: Vec3,
}

/// Cell geometry of one mesh partition.
///
/// Indices run over local cells only. Faces between two local cells are
/// internal; faces to another partition are coupled and carry the remote
/// cell centre so fields can be interpolated across them.
pub trait Mesh: Send + Sync {
    fn n_cells(&self) -> usize;

    fn centre(&self, cell: usize) -> Vec3;

    fn volume(&self, cell: usize) -> Real;

    /// Axis-aligned bounds of the cell.
    fn bounds(&self, cell: usize) -> BoundBox;

    /// True when the cell is an axis-aligned hexahedron filling its bounds.
    fn is_hex(&self, cell: usize) -> bool;

    /// (owner, neighbour) pairs of faces between local cells.
    fn internal_faces(&self) -> &[(usize, usize)];

    fn coupled_faces(&self) -> &[CoupledFace];

    /// Points on the perimeter of a boundary patch, local part only. `None`
    /// when the mesh has no patch of that name.
    fn patch_edge_points(&self, name: &str) -> Option<&[Vec3]>;

    /// Cells whose bounds overlap `region`.
    fn cells_overlapping(&self, region: &BoundBox) -> Vec<usize> {
        (0..self.n_cells())
            .filter(|&c| self.bounds(c).overlaps(region))
            .collect()
    }
}

/// Geometry of one explicitly listed cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGeometry {
    pub centre: Vec3,
    pub volume: Real,
    pub bounds: BoundBox,
    pub hex: bool,
}

impl CellGeometry {
    /// Axis-aligned box cell.
    pub fn hex(bounds: BoundBox) -> Self {
        Self {
            centre: bounds.centre(),
            volume: bounds.volume(),
            bounds,
            hex: true,
        }
    }

    /// Arbitrary polyhedron summarised by its centroid, volume and bounds.
    pub fn polyhedron(centre: Vec3, volume: Real, bounds: BoundBox) -> Self {
        Self {
            centre,
            volume,
            bounds,
            hex: false,
        }
    }
}

/// Unstructured mesh given cell by cell.
#[derive(Debug, Clone, Default)]
pub struct CellList {
    cells: Vec<CellGeometry>,
    faces: Vec<(usize, usize)>,
    coupled: Vec<CoupledFace>,
    patches: HashMap<String, Vec<Vec3>>,
}

impl CellList {
    pub fn new(cells: Vec<CellGeometry>) -> MeshResult<Self> {
        for cell in &cells {
            if !(cell.volume > 0.0) || !cell.volume.is_finite() {
                return Err(MeshError::InvalidArg {
                    what: "cell volume must be positive",
                });
            }
        }
        Ok(Self {
            cells,
            ..Self::default()
        })
    }

    pub fn with_faces(mut self, faces: Vec<(usize, usize)>) -> MeshResult<Self> {
        let n_cells = self.cells.len();
        for &(a, b) in &faces {
            for cell in [a, b] {
                if cell >= n_cells {
                    return Err(MeshError::InvalidCellRef { cell, n_cells });
                }
            }
        }
        self.faces = faces;
        Ok(self)
    }

    pub fn with_coupled_faces(mut self, coupled: Vec<CoupledFace>) -> MeshResult<Self> {
        let n_cells = self.cells.len();
        if let Some(face) = coupled.iter().find(|f| f.owner >= n_cells) {
            return Err(MeshError::InvalidCellRef {
                cell: face.owner,
                n_cells,
            });
        }
        self.coupled = coupled;
        Ok(self)
    }

    pub fn with_patch(mut self, name: impl Into<String>, points: Vec<Vec3>) -> Self {
        self.patches.insert(name.into(), points);
        self
    }

    pub fn cells(&self) -> &[CellGeometry] {
        &self.cells
    }
}

impl Mesh for CellList {
    fn n_cells(&self) -> usize {
        self.cells.len()
    }

    fn centre(&self, cell: usize) -> Vec3 {
        self.cells[cell].centre
    }

    fn volume(&self, cell: usize) -> Real {
        self.cells[cell].volume
    }

    fn bounds(&self, cell: usize) -> BoundBox {
        self.cells[cell].bounds
    }

    fn is_hex(&self, cell: usize) -> bool {
        self.cells[cell].hex
    }

    fn internal_faces(&self) -> &[(usize, usize)] {
        &self.faces
    }

    fn coupled_faces(&self) -> &[CoupledFace] {
        &self.coupled
    }

    fn patch_edge_points(&self, name: &str) -> Option<&[Vec3]> {
        self.patches.get(name).map(Vec::as_slice)
    }
}
