use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::gfx::{bounds::BoundingVolume, geometry::GeometryData, resources::material::Material};

use super::vertex::Vertex3D;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a geometry for GPU buffer caching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(u64);

/// Primitive assembly for a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Immutable vertex and index data
///
/// Geometry is shared between clones of a node; it never changes after
/// creation, only the transforms and materials around it do.
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    topology: Topology,
    local_bounds: BoundingVolume,
}

impl Geometry {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>, topology: Topology) -> Self {
        let local_bounds = BoundingVolume::from_points(
            vertices
                .iter()
                .map(|v| cgmath::Vector3::new(v.position[0], v.position[1], v.position[2])),
        );
        Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            vertices,
            indices,
            topology,
            local_bounds,
        }
    }

    /// Builds triangle geometry from flat position/normal/index arrays
    ///
    /// Normals are computed from the faces when they are missing or do not
    /// match the position count.
    pub fn from_flat(positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let computed;
        let normals = if !normals.is_empty() && normals.len() == positions.len() {
            normals
        } else {
            computed = calculate_face_normals(positions, &indices);
            &computed
        };

        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D::new([p[0], p[1], p[2]], [n[0], n[1], n[2]]))
            .collect();

        Self::new(vertices, indices, Topology::Triangles)
    }

    /// Converts procedurally generated primitives
    pub fn from_geometry_data(data: &GeometryData, topology: Topology) -> Self {
        let (vertices, indices) = data.to_scene_format();
        Self::new(vertices, indices, topology)
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn positions(&self) -> impl Iterator<Item = &[f32; 3]> {
        self.vertices.iter().map(|v| &v.position)
    }

    /// Bounds in the geometry's own coordinate space
    pub fn local_bounds(&self) -> &BoundingVolume {
        &self.local_bounds
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

/// Calculates smooth vertex normals by averaging adjacent face normals
pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut normals = vec![0.0; vertex_count * 3];

    let vertex = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

    for triangle in indices.chunks_exact(3) {
        let (i0, i1, i2) = (
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        );
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }
        let (v0, v1, v2) = (vertex(i0), vertex(i1), vertex(i2));

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for &idx in &[i0, i1, i2] {
            normals[idx * 3] += face_normal[0];
            normals[idx * 3 + 1] += face_normal[1];
            normals[idx * 3 + 2] += face_normal[2];
        }
    }

    for n in normals.chunks_exact_mut(3) {
        let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if length > 0.0 {
            n[0] /= length;
            n[1] /= length;
            n[2] /= length;
        } else {
            n[1] = 1.0;
        }
    }

    normals
}

/// A renderable surface: shared geometry plus its own material
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_normals_when_missing() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let geometry = Geometry::from_flat(&positions, &[], vec![0, 1, 2]);
        for v in geometry.vertices() {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn keeps_supplied_normals() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let geometry = Geometry::from_flat(&positions, &normals, vec![0, 1, 2]);
        assert_eq!(geometry.vertices()[2].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn local_bounds_cover_vertices() {
        let positions = [0.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0, 4.0];
        let geometry = Geometry::from_flat(&positions, &[], vec![0, 1, 2]);
        let size = geometry.local_bounds().size();
        assert_eq!((size.x, size.y, size.z), (2.0, 1.0, 4.0));
    }

    #[test]
    fn geometry_ids_are_unique() {
        let a = Geometry::new(Vec::new(), Vec::new(), Topology::Triangles);
        let b = Geometry::new(Vec::new(), Vec::new(), Topology::Triangles);
        assert_ne!(a.id(), b.id());
        assert!(a.is_empty());
    }
}
