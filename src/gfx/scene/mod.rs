//! # Scene Management Module
//!
//! The scene graph the viewer presents: nodes with local transforms, meshes
//! sharing immutable geometry, and the [`Scene`] that holds the environment
//! plus the single live object.
//!
//! ## Key Components
//!
//! - [`Scene`] - Environment plus the placeholder or presented asset
//! - [`Node`] - Transform hierarchy; cloning a node deep-copies it
//! - [`Mesh`] - Shared [`Geometry`] with its own [`Material`](crate::gfx::resources::material::Material)
//! - [`Vertex3D`] - GPU vertex with position and normal
//!
//! ```
//! use pairview::gfx::scene::{Node, Transform};
//!
//! let mut group = Node::group("pair", vec![Node::new("left"), Node::new("right")]);
//! group.transform = Transform::from_trs([0.0, 1.0, 0.0].into(), cgmath::Deg(90.0), 2.0);
//! assert_eq!(group.children.len(), 2);
//! ```

pub mod mesh;
pub mod node;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use mesh::{Geometry, GeometryId, Mesh, Topology};
pub use node::{Node, Transform};
pub use scene::{DrawItem, LiveObject, Scene};
pub use vertex::Vertex3D;
