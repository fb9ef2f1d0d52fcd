//! Axis-aligned bounding volumes
//!
//! Measures scene-graph subtrees in world space. Measurement walks every
//! vertex through the accumulated node transforms, so rotated or mirrored
//! instances are bounded tightly.

use cgmath::{Matrix4, Point3, Transform as _, Vector3};

use crate::gfx::scene::node::Node;

/// Axis-aligned bounding box
///
/// The empty volume has `min = +inf` and `max = -inf`, so expanding it by any
/// point yields that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingVolume {
    /// Largest dimension below which a volume cannot be scaled to fit
    pub const MIN_EXTENT: f32 = 1e-6;

    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Creates a volume from a set of points
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vector3<f32>>,
    {
        let mut volume = Self::empty();
        for p in points {
            volume.expand_by_point(p);
        }
        volume
    }

    /// Measures a node and its whole subtree in world space
    ///
    /// The node's own transform is included, as if it hung from an
    /// identity-transformed parent.
    pub fn from_node(node: &Node) -> Self {
        let mut volume = Self::empty();
        node.visit_meshes(&mut |world, mesh| {
            volume.expand_by_transformed_points(world, mesh.geometry.positions());
        });
        volume
    }

    pub fn expand_by_point(&mut self, p: Vector3<f32>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    fn expand_by_transformed_points<'a, I>(&mut self, matrix: &Matrix4<f32>, points: I)
    where
        I: IntoIterator<Item = &'a [f32; 3]>,
    {
        for p in points {
            let world = matrix.transform_point(Point3::new(p[0], p[1], p[2]));
            self.expand_by_point(Vector3::new(world.x, world.y, world.z));
        }
    }

    /// Smallest volume containing both
    pub fn union(&self, other: &BoundingVolume) -> Self {
        Self {
            min: Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// True when no point has been added
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// True when the volume cannot be normalized: empty, collapsed to a
    /// point, or not finite
    pub fn is_degenerate(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let extent = self.max_dimension();
        !extent.is_finite() || extent <= Self::MIN_EXTENT
    }

    /// Size per axis (max - min); zero for empty volumes
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        (self.min + self.max) * 0.5
    }

    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    /// Applies a transformation matrix by transforming all 8 corners
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        let corners = [
            [lo.x, lo.y, lo.z],
            [hi.x, lo.y, lo.z],
            [lo.x, hi.y, lo.z],
            [lo.x, lo.y, hi.z],
            [hi.x, hi.y, lo.z],
            [hi.x, lo.y, hi.z],
            [lo.x, hi.y, hi.z],
            [hi.x, hi.y, hi.z],
        ];
        let mut volume = Self::empty();
        volume.expand_by_transformed_points(matrix, corners.iter());
        volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, SquareMatrix};

    #[test]
    fn test_volume_from_points() {
        let volume = BoundingVolume::from_points([
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-1.0, -1.0, -1.0),
        ]);

        assert_eq!(volume.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(volume.max, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(volume.size(), Vector3::new(2.0, 2.0, 2.0));
        assert!(!volume.is_degenerate());
    }

    #[test]
    fn test_empty_volume() {
        let volume = BoundingVolume::empty();
        assert!(volume.is_empty());
        assert!(volume.is_degenerate());
        assert_eq!(volume.size(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(volume.transform(&Matrix4::identity()), volume);
    }

    #[test]
    fn test_single_point_is_degenerate_but_not_empty() {
        let volume = BoundingVolume::from_points([Vector3::new(3.0, 1.0, 2.0)]);
        assert!(!volume.is_empty());
        assert!(volume.is_degenerate());
    }

    #[test]
    fn test_flat_volume_is_usable() {
        let volume = BoundingVolume::from_points([
            Vector3::new(-1.0, 0.0, -1.0),
            Vector3::new(1.0, 0.0, 1.0),
        ]);
        assert!(!volume.is_degenerate());
        assert_eq!(volume.max_dimension(), 2.0);
    }

    #[test]
    fn test_transform_rotates_extent() {
        let volume = BoundingVolume::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 1.0, 4.0));
        let rotated = volume.transform(&Matrix4::from_angle_y(Deg(90.0)));
        let size = rotated.size();
        assert!((size.x - 4.0).abs() < 1e-5);
        assert!((size.y - 1.0).abs() < 1e-5);
        assert!((size.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_union() {
        let a = BoundingVolume::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let b = BoundingVolume::new(Vector3::new(-2.0, 0.5, 0.0), Vector3::new(0.5, 3.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vector3::new(-2.0, 0.0, 0.0));
        assert_eq!(u.max, Vector3::new(1.0, 3.0, 1.0));
        assert_eq!(BoundingVolume::empty().union(&a), a);
    }
}
