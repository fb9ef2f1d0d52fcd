use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};

use crate::gfx::{
    environment::SceneEnvironment,
    geometry::generate_cube,
    resources::material::{Color, Material},
    scene::{
        mesh::{Geometry, Mesh, Topology},
        node::Node,
    },
};
use crate::viewer::pairing::PresentedObject;

/// What currently occupies the stage
#[derive(Debug, Clone)]
pub enum LiveObject {
    /// Neutral stand-in shown until an asset is presented
    Placeholder(Node),
    /// A loaded, normalized and composed asset
    Presented(PresentedObject),
}

impl LiveObject {
    pub fn root(&self) -> &Node {
        match self {
            LiveObject::Placeholder(node) => node,
            LiveObject::Presented(object) => object.root(),
        }
    }
}

/// A mesh ready to draw with its world matrix
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub model: Matrix4<f32>,
    pub mesh: &'a Mesh,
}

/// Main scene: the static environment plus at most one live object
///
/// Presenting a new object replaces the previous one (or the placeholder)
/// in a single step, so the stage never shows two objects at once.
pub struct Scene {
    pub environment: SceneEnvironment,
    live: Option<LiveObject>,
}

impl Scene {
    pub fn new(environment: SceneEnvironment) -> Self {
        Self {
            environment,
            live: None,
        }
    }

    /// Updates camera matrices for the next frame
    pub fn update(&mut self) {
        self.environment.camera_mut().update_view_proj();
    }

    pub fn live(&self) -> Option<&LiveObject> {
        self.live.as_ref()
    }

    /// The presented asset, if any
    pub fn presented(&self) -> Option<&PresentedObject> {
        match &self.live {
            Some(LiveObject::Presented(object)) => Some(object),
            _ => None,
        }
    }

    pub fn presented_mut(&mut self) -> Option<&mut PresentedObject> {
        match &mut self.live {
            Some(LiveObject::Presented(object)) => Some(object),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<&Node> {
        match &self.live {
            Some(LiveObject::Placeholder(node)) => Some(node),
            _ => None,
        }
    }

    /// Replaces whatever is on stage with `object`; returns what was there
    pub fn present(&mut self, object: PresentedObject) -> Option<LiveObject> {
        self.live.replace(LiveObject::Presented(object))
    }

    /// Puts the placeholder on stage unless an asset is already presented
    pub fn show_placeholder(&mut self) {
        if self.presented().is_some() {
            return;
        }
        if self.placeholder().is_none() {
            self.live = Some(LiveObject::Placeholder(placeholder_node()));
        }
    }

    /// Removes the live object
    pub fn clear(&mut self) -> Option<LiveObject> {
        self.live.take()
    }

    /// Flattens the scene into draw order: floor, grid, then the live object
    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        let env = &self.environment;
        let mut items = vec![DrawItem {
            model: Matrix4::identity(),
            mesh: &env.floor.mesh,
        }];

        if env.grid.visible {
            let model = Matrix4::from_translation(env.grid_translation());
            items.push(DrawItem {
                model,
                mesh: &env.grid.lines,
            });
            items.push(DrawItem {
                model,
                mesh: &env.grid.center_lines,
            });
        }

        if let Some(live) = &self.live {
            live.root().visit_visible_meshes(&mut |world, mesh| {
                if !mesh.geometry.is_empty() {
                    items.push(DrawItem { model: *world, mesh });
                }
            });
        }

        items
    }
}

/// Unit cube resting on the floor with a neutral finish
pub fn placeholder_node() -> Node {
    let geometry = Arc::new(Geometry::from_geometry_data(
        &generate_cube(),
        Topology::Triangles,
    ));
    let material = Material::new("placeholder", Color::from_hex(0x777777), 0.0, 0.8);
    let mut node = Node::with_meshes(
        "placeholder",
        vec![Mesh::new(geometry, material).with_shadows(true, true)],
    );
    node.transform.translation.y = 0.5;
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::bounds::BoundingVolume;

    fn scene() -> Scene {
        Scene::new(SceneEnvironment::build(800, 600, &ViewerConfig::default()))
    }

    #[test]
    fn placeholder_rests_on_floor() {
        let bounds = BoundingVolume::from_node(&placeholder_node());
        assert!(bounds.min.y.abs() < 1e-6);
        assert!((bounds.max.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_scene_draws_floor_and_grid() {
        let scene = scene();
        let items = scene.draw_items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].mesh.geometry.topology(), Topology::Triangles);
        assert_eq!(items[1].mesh.geometry.topology(), Topology::Lines);
    }

    #[test]
    fn hidden_grid_is_not_drawn() {
        let mut scene = scene();
        scene.environment.grid.visible = false;
        assert_eq!(scene.draw_items().len(), 1);
    }

    #[test]
    fn placeholder_is_shown_once() {
        let mut scene = scene();
        scene.show_placeholder();
        scene.show_placeholder();
        assert!(scene.placeholder().is_some());
        assert!(scene.presented().is_none());
        assert_eq!(scene.draw_items().len(), 4);

        scene.clear();
        assert!(scene.live().is_none());
    }
}
