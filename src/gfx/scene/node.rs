use cgmath::{Deg, Matrix4, One, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};

use super::mesh::Mesh;

/// Local transform of a node: translation, rotation and per-axis scale
///
/// The matrix is composed as `T * R * S`, so a negative scale component
/// mirrors the node in its own space before it is rotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vector3 {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
        rotation: Quaternion {
            s: 1.0,
            v: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        },
        scale: Vector3 {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        },
    };

    /// Builds a transform from glTF-style decomposed parts
    ///
    /// `rotation` is `[x, y, z, w]`.
    pub fn from_decomposed(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            translation: translation.into(),
            rotation: Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
            scale: scale.into(),
        }
    }

    /// Creates a complete transform from translation, yaw and uniform scale
    pub fn from_trs(translation: Vector3<f32>, yaw: Deg<f32>, scale: f32) -> Self {
        Self {
            translation,
            rotation: Quaternion::from_angle_y(yaw),
            scale: Vector3::new(scale, scale, scale),
        }
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    /// Replaces the rotation with a pure rotation around Y
    pub fn set_yaw(&mut self, angle: impl Into<Rad<f32>>) {
        self.rotation = Quaternion::from_angle_y(angle);
    }

    /// Applies an extra rotation around Y on top of the current one
    pub fn rotate_y(&mut self, angle: impl Into<Rad<f32>>) {
        self.rotation = Quaternion::from_angle_y(angle) * self.rotation;
    }

    /// Rotation around Y extracted from the quaternion, in degrees
    ///
    /// Exact for pure yaw rotations, which is all the viewer itself applies.
    pub fn yaw(&self) -> Deg<f32> {
        let q = self.rotation;
        let siny = 2.0 * (q.s * q.v.y + q.v.z * q.v.x);
        let cosy = 1.0 - 2.0 * (q.v.y * q.v.y + q.v.x * q.v.x);
        Deg::from(Rad(siny.atan2(cosy)))
    }

    /// Reset to identity
    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.translation);
        let r = Matrix4::from(self.rotation);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s // Order matters: T * R * S
    }

    pub fn is_finite(&self) -> bool {
        let v = |v: Vector3<f32>| v.x.is_finite() && v.y.is_finite() && v.z.is_finite();
        v(self.translation) && v(self.scale) && self.rotation.s.is_finite() && v(self.rotation.v)
    }

    /// True when the rotation is the identity
    pub fn is_unrotated(&self) -> bool {
        self.rotation == Quaternion::one()
    }
}

/// A node in the scene graph
///
/// Nodes own their meshes and children, so `clone()` is a deep copy of the
/// hierarchy: every clone carries independent transforms and materials while
/// the immutable vertex data stays shared.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub meshes: Vec<Mesh>,
    pub children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new("node")
    }
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            visible: true,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a node carrying the given meshes
    pub fn with_meshes(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            meshes,
            ..Self::new(name)
        }
    }

    /// Creates a pure grouping node
    pub fn group(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(name)
        }
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Visits every mesh in the subtree with its world matrix
    ///
    /// The node's own transform is applied, as if the node hung directly
    /// below the scene root.
    pub fn visit_meshes<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&Matrix4<f32>, &'a Mesh),
    {
        self.visit_meshes_from(&Matrix4::identity(), f);
    }

    /// Like [`visit_meshes`](Self::visit_meshes) but starting below `parent`
    pub fn visit_meshes_from<'a, F>(&'a self, parent: &Matrix4<f32>, f: &mut F)
    where
        F: FnMut(&Matrix4<f32>, &'a Mesh),
    {
        let world = parent * self.transform.matrix();
        for mesh in &self.meshes {
            f(&world, mesh);
        }
        for child in &self.children {
            child.visit_meshes_from(&world, f);
        }
    }

    /// Visits only meshes of visible nodes; hidden nodes hide their subtree
    pub fn visit_visible_meshes<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&Matrix4<f32>, &'a Mesh),
    {
        fn walk<'a, F>(node: &'a Node, parent: &Matrix4<f32>, f: &mut F)
        where
            F: FnMut(&Matrix4<f32>, &'a Mesh),
        {
            if !node.visible {
                return;
            }
            let world = parent * node.transform.matrix();
            for mesh in &node.meshes {
                f(&world, mesh);
            }
            for child in &node.children {
                walk(child, &world, f);
            }
        }
        walk(self, &Matrix4::identity(), f);
    }

    /// Applies `f` to every mesh in the subtree
    pub fn for_each_mesh_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Mesh),
    {
        for mesh in &mut self.meshes {
            f(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(f);
        }
    }

    /// Collects references to every mesh in the subtree
    pub fn meshes_recursive(&self) -> Vec<&Mesh> {
        let mut out = Vec::new();
        self.collect_meshes(&mut out);
        out
    }

    fn collect_meshes<'a>(&'a self, out: &mut Vec<&'a Mesh>) {
        out.extend(self.meshes.iter());
        for child in &self.children {
            child.collect_meshes(out);
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len() + self.children.iter().map(Node::mesh_count).sum::<usize>()
    }

    /// True when every transform in the subtree is finite
    pub fn is_finite(&self) -> bool {
        self.transform.is_finite() && self.children.iter().all(Node::is_finite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::{Color, Material};
    use crate::gfx::scene::mesh::{Geometry, Topology};
    use crate::gfx::scene::vertex::Vertex3D;
    use std::sync::Arc;

    fn leaf() -> Node {
        let geometry = Arc::new(Geometry::new(
            vec![Vertex3D::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0])],
            vec![0],
            Topology::Triangles,
        ));
        Node::with_meshes("leaf", vec![Mesh::new(geometry, Material::default())])
    }

    #[test]
    fn clone_is_deep_for_transforms_and_materials() {
        let original = Node::group("root", vec![leaf()]);
        let mut copy = original.clone();

        copy.transform.translation.x = 5.0;
        copy.children[0].meshes[0].material.base_color = Color::BLACK;

        assert_eq!(original.transform.translation.x, 0.0);
        assert_ne!(original.children[0].meshes[0].material.base_color, Color::BLACK);
        assert!(Arc::ptr_eq(
            &original.children[0].meshes[0].geometry,
            &copy.children[0].meshes[0].geometry
        ));
    }

    #[test]
    fn world_matrix_accumulates_down_the_tree() {
        let mut root = Node::group("root", vec![leaf()]);
        root.transform.translation = Vector3::new(0.0, 2.0, 0.0);
        root.children[0].transform.set_uniform_scale(3.0);

        let mut seen = Vec::new();
        root.visit_meshes(&mut |world, _| {
            seen.push(world * cgmath::Vector4::new(1.0, 0.0, 0.0, 1.0));
        });
        assert_eq!(seen, vec![cgmath::Vector4::new(3.0, 2.0, 0.0, 1.0)]);
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let mut root = Node::group("root", vec![leaf(), leaf()]);
        root.children[1].visible = false;
        let mut count = 0;
        root.visit_visible_meshes(&mut |_, _| count += 1);
        assert_eq!(count, 1);
        assert_eq!(root.mesh_count(), 2);
    }

    #[test]
    fn yaw_round_trips() {
        let mut t = Transform::IDENTITY;
        t.set_yaw(Deg(90.0));
        assert!((t.yaw().0 - 90.0).abs() < 1e-4);
        t.set_yaw(Deg(-90.0));
        assert!((t.yaw().0 + 90.0).abs() < 1e-4);
    }

    #[test]
    fn mirrored_scale_flips_x() {
        let mut t = Transform::IDENTITY;
        t.scale.x = -1.0;
        let p = t.matrix() * cgmath::Vector4::new(2.0, 1.0, 0.0, 1.0);
        assert_eq!(p, cgmath::Vector4::new(-2.0, 1.0, 0.0, 1.0));
    }
}
