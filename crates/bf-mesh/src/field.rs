//! Cell-centred temperature field.

use bf_core::{Real, Vec3};

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

/// Temperatures (K) at local cell centres, plus the remote cell values
/// across each coupled face.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureField {
    values: Vec<Real>,
    halo: Vec<Real>,
}

fn check_sizes(mesh: &dyn Mesh, values: &[Real], halo: &[Real]) -> MeshResult<()> {
    if values.len() != mesh.n_cells() {
        return Err(MeshError::FieldSize {
            what: "temperature field",
            expected: mesh.n_cells(),
            found: values.len(),
        });
    }
    if halo.len() != mesh.coupled_faces().len() {
        return Err(MeshError::FieldSize {
            what: "temperature halo",
            expected: mesh.coupled_faces().len(),
            found: halo.len(),
        });
    }
    Ok(())
}

impl TemperatureField {
    pub fn new(mesh: &dyn Mesh, values: Vec<Real>, halo: Vec<Real>) -> MeshResult<Self> {
        check_sizes(mesh, &values, &halo)?;
        Ok(Self { values, halo })
    }

    pub fn uniform(mesh: &dyn Mesh, value: Real) -> Self {
        Self {
            values: vec![value; mesh.n_cells()],
            halo: vec![value; mesh.coupled_faces().len()],
        }
    }

    /// Sample `f` at every local and remote cell centre.
    pub fn from_fn(mesh: &dyn Mesh, f: impl Fn(&Vec3) -> Real) -> Self {
        Self {
            values: (0..mesh.n_cells()).map(|c| f(&mesh.centre(c))).collect(),
            halo: mesh
                .coupled_faces()
                .iter()
                .map(|face| f(&face.neighbour_centre))
                .collect(),
        }
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Real] {
        &mut self.values
    }

    /// Remote values, one per coupled face.
    pub fn halo(&self) -> &[Real] {
        &self.halo
    }

    pub fn halo_mut(&mut self) -> &mut [Real] {
        &mut self.halo
    }

    /// Check the field still matches `mesh`.
    pub fn check(&self, mesh: &dyn Mesh) -> MeshResult<()> {
        check_sizes(mesh, &self.values, &self.halo)
    }
}
