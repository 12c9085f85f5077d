//! Isotherm crossings between neighbouring cell centres.

use bf_core::{Real, Vec3};

use crate::field::TemperatureField;
use crate::mesh::Mesh;

fn crossing(a: &Vec3, ta: Real, b: &Vec3, tb: Real, iso: Real) -> Option<Vec3> {
    let (lo, hi) = if ta <= tb { (ta, tb) } else { (tb, ta) };
    if !(lo < iso && iso <= hi) {
        return None;
    }
    let frac = (iso - ta) / (tb - ta);
    Some(a + (b - a) * frac)
}

/// Points where `iso` is crossed along the line joining the centres of every
/// pair of face neighbours, interpolating linearly. Includes faces coupled to
/// other partitions, using the halo values.
pub fn iso_points(mesh: &dyn Mesh, temperature: &TemperatureField, iso: Real) -> Vec<Vec3> {
    let t = temperature.values();
    let mut points = Vec::new();

    for &(a, b) in mesh.internal_faces() {
        if let Some(p) = crossing(&mesh.centre(a), t[a], &mesh.centre(b), t[b], iso) {
            points.push(p);
        }
    }

    for (face, &remote) in mesh.coupled_faces().iter().zip(temperature.halo()) {
        let a = face.owner;
        if let Some(p) = crossing(&mesh.centre(a), t[a], &face.neighbour_centre, remote, iso) {
            points.push(p);
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CartesianMesh;
    use approx::assert_relative_eq;
    use bf_core::vec3;

    #[test]
    fn linear_profile_crossing() {
        // Column of 4 cells along z; temperature rises towards the top.
        let mesh = CartesianMesh::uniform(vec3(0.0, 0.0, -4.0), vec3(1.0, 1.0, 0.0), [1, 1, 4]).unwrap();
        let field = TemperatureField::from_fn(&mesh, |p| 1000.0 + 100.0 * p.z);
        let points = iso_points(&mesh, &field, 800.0);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].z, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn uniform_field_has_no_crossings() {
        let mesh = CartesianMesh::uniform(Vec3::zeros(), Vec3::repeat(1.0), [3, 3, 3]).unwrap();
        let field = TemperatureField::uniform(&mesh, 300.0);
        assert!(iso_points(&mesh, &field, 300.0).is_empty());
    }

    #[test]
    fn crossing_on_partition_boundary() {
        let mesh = CartesianMesh::uniform(Vec3::zeros(), vec3(2.0, 1.0, 1.0), [2, 1, 1]).unwrap();
        let left = mesh.partition(0, 2).unwrap();
        let field = TemperatureField::from_fn(&left, |p| 100.0 * p.x);
        let points = iso_points(&left, &field, 100.0);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 1.0, epsilon = 1e-12);
    }
}
