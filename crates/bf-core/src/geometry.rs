//! Vectors and axis-aligned boxes.

use crate::numeric::Real;
use nalgebra::Vector3;

/// Cartesian 3-vector used for positions, offsets and dimensions.
pub type Vec3 = Vector3<Real>;

/// Build a `Vec3` from components.
#[inline]
pub fn vec3(x: Real, y: Real, z: Real) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centred on `centre` with the given half-extents.
    pub fn around(centre: &Vec3, half: &Vec3) -> Self {
        Self {
            min: centre - half,
            max: centre + half,
        }
    }

    /// Grow the box by `delta` on every side.
    pub fn inflate(&self, delta: Real) -> Self {
        let d = Vec3::repeat(delta);
        Self {
            min: self.min - d,
            max: self.max + d,
        }
    }

    pub fn span(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn centre(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    pub fn volume(&self) -> Real {
        let s = self.span();
        s.x * s.y * s.z
    }

    /// Closed-interval overlap test on every axis.
    pub fn overlaps(&self, other: &BoundBox) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_symmetric_and_touching_counts() {
        let a = BoundBox::new(vec3(0.0, 0.0, 0.0), vec3(1.0, 1.0, 1.0));
        let b = BoundBox::new(vec3(1.0, 0.5, 0.5), vec3(2.0, 2.0, 2.0));
        let c = BoundBox::new(vec3(1.5, 0.0, 0.0), vec3(2.0, 1.0, 1.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn around_and_volume() {
        let b = BoundBox::around(&vec3(1.0, 2.0, 3.0), &vec3(0.5, 1.0, 2.0));
        assert_eq!(b.min, vec3(0.5, 1.0, 1.0));
        assert_eq!(b.max, vec3(1.5, 3.0, 5.0));
        assert!((b.volume() - 8.0).abs() < 1e-12);
        assert_eq!(b.centre(), vec3(1.0, 2.0, 3.0));
    }

    proptest::proptest! {
        #[test]
        fn inflated_box_contains_original(
            x in -10.0..10.0f64, y in -10.0..10.0f64, z in -10.0..10.0f64,
            h in 0.01..5.0f64, d in 0.0..1.0f64,
        ) {
            let b = BoundBox::around(&vec3(x, y, z), &vec3(h, h, h));
            let grown = b.inflate(d);
            proptest::prop_assert!((0..3).all(|i| grown.min[i] <= b.min[i] && grown.max[i] >= b.max[i]));
            proptest::prop_assert!(grown.overlaps(&b) && b.overlaps(&grown));
        }
    }
}
