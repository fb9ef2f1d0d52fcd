//! # Procedural Geometry Generation
//!
//! Generates the stand-in shapes the viewer needs without external files: the
//! placeholder cube, the floor plane and the reference grid.
//!
//! ```rust
//! use pairview::gfx::geometry::{generate_cube, generate_ground_plane, generate_grid_lines};
//!
//! let cube = generate_cube();
//! let floor = generate_ground_plane(20.0, 20.0, 1, 1);
//! let grid = generate_grid_lines(20.0, 10);
//! assert_eq!(cube.triangle_count(), 12);
//! assert_eq!(floor.triangle_count(), 2);
//! assert_eq!(grid.lines.vertex_count(), 2 * 2 * 10);
//! ```

pub mod primitives;

pub use primitives::*;

/// Generated geometry data ready for conversion into scene meshes
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding) or line segment pairs
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Convert to the vertex format used by the scene and renderer
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex3D::new(*p, self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0])))
            .collect();

        (vertices, self.indices.clone())
    }
}
