//! # Scene Environment
//!
//! The static part of the viewer's scene: camera, light rig, floor, grid and
//! fog. It is built once per viewer and only touched afterwards by the
//! viewport responder, the orbit controls and the per-frame grid rule.

use std::sync::Arc;

use cgmath::Vector3;

use crate::config::{GridVisibilityRule, ViewerConfig};
use crate::gfx::{
    camera::{CameraController, CameraManager, OrbitCamera},
    geometry::{generate_ground_plane, generate_grid_lines, GeometryData},
    resources::material::{Color, Material},
    scene::mesh::{Geometry, Mesh, Topology},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Sky/ground gradient light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: Color,
    pub ground_color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    /// Light position; it shines towards the origin
    pub position: Vector3<f32>,
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
    pub shadow_bias: f32,
}

/// Rectangular soft-box light aimed at a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLight {
    pub color: Color,
    pub intensity: f32,
    pub width: f32,
    pub height: f32,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
}

/// The full set of lights
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub hemisphere: HemisphereLight,
    /// Shadow-casting key light
    pub key: DirectionalLight,
    pub back: DirectionalLight,
    pub area: AreaLight,
    pub fill: PointLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 1.2,
            },
            hemisphere: HemisphereLight {
                sky_color: Color::WHITE,
                ground_color: Color::from_hex(0x222222),
                intensity: 1.0,
                position: Vector3::new(0.0, 10.0, 0.0),
            },
            key: DirectionalLight {
                color: Color::WHITE,
                intensity: 2.5,
                position: Vector3::new(5.0, 10.0, 7.0),
                cast_shadow: true,
                shadow_map_size: 2048,
                shadow_bias: -0.0005,
            },
            back: DirectionalLight {
                color: Color::WHITE,
                intensity: 0.7,
                position: Vector3::new(0.0, -4.0, -6.0),
                cast_shadow: false,
                shadow_map_size: 0,
                shadow_bias: 0.0,
            },
            area: AreaLight {
                color: Color::WHITE,
                intensity: 2.5,
                width: 6.0,
                height: 6.0,
                position: Vector3::new(0.0, 5.0, 5.0),
                target: Vector3::new(0.0, 0.0, 0.0),
            },
            fill: PointLight {
                color: Color::WHITE,
                intensity: 0.7,
                position: Vector3::new(-4.0, 3.0, -4.0),
            },
        }
    }
}

impl LightRig {
    /// Lights that contribute direct shading; the ambient and hemisphere
    /// terms are separate
    pub fn direct_light_count(&self) -> usize {
        4
    }

    pub fn shadow_casters(&self) -> impl Iterator<Item = &DirectionalLight> {
        [&self.key, &self.back].into_iter().filter(|l| l.cast_shadow)
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

/// Semi-transparent ground plane at y = 0
#[derive(Debug, Clone)]
pub struct Floor {
    pub size: f32,
    pub mesh: Mesh,
}

/// Fading reference grid drawn just above the floor
#[derive(Debug, Clone)]
pub struct Grid {
    pub size: f32,
    pub divisions: u32,
    pub height: f32,
    pub visible: bool,
    pub center_lines: Mesh,
    pub lines: Mesh,
}

/// Output tuning that is not part of the scene itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub background: Color,
    pub exposure: f32,
    pub max_pixel_ratio: f32,
}

/// Camera, lights, floor, grid and fog of the viewer
pub struct SceneEnvironment {
    pub camera_manager: CameraManager,
    pub lights: LightRig,
    pub floor: Floor,
    pub grid: Grid,
    pub fog: Fog,
    pub render_settings: RenderSettings,
}

impl SceneEnvironment {
    const FLOOR_SIZE: f32 = 2000.0;
    const GRID_DIVISIONS: u32 = 300;
    const GRID_HEIGHT: f32 = 0.01;
    const GRID_OPACITY: f32 = 0.18;
    const BACKGROUND: u32 = 0x111111;

    /// Builds the environment for a container of `width` x `height` pixels
    ///
    /// Both dimensions must be non-zero; a zero-size container is a caller
    /// error.
    pub fn build(width: u32, height: u32, config: &ViewerConfig) -> Self {
        debug_assert!(width > 0 && height > 0, "container has zero size");

        let narrow = config.is_narrow(width);
        let settings = &config.camera;
        let eye = if narrow {
            settings.narrow_position
        } else {
            settings.position
        };
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let camera = OrbitCamera::looking_at(eye, settings.target, aspect)
            .with_fovy(cgmath::Deg(settings.fov_degrees))
            .with_clip(settings.znear, settings.zfar);
        let rotate_speed = if narrow {
            settings.narrow_rotate_speed
        } else {
            settings.rotate_speed
        };
        let controller = CameraController::new(rotate_speed, settings.damping);

        let floor_geometry = Arc::new(Geometry::from_geometry_data(
            &generate_ground_plane(Self::FLOOR_SIZE, Self::FLOOR_SIZE, 1, 1),
            Topology::Triangles,
        ));
        let floor_material = Material::new("floor", Color::from_hex(0x181818), 0.0, 1.0)
            .with_opacity(0.98)
            .with_double_sided(true);
        let floor = Floor {
            size: Self::FLOOR_SIZE,
            mesh: Mesh::new(floor_geometry, floor_material).with_shadows(false, true),
        };

        let grid_lines = generate_grid_lines(Self::FLOOR_SIZE, Self::GRID_DIVISIONS);
        let line_mesh = |data: &GeometryData, hex: u32, name: &str| {
            let geometry = Arc::new(Geometry::from_geometry_data(data, Topology::Lines));
            let material = Material::new(name, Color::from_hex(hex), 0.0, 1.0)
                .with_opacity(Self::GRID_OPACITY)
                .unlit();
            Mesh::new(geometry, material)
        };
        let grid = Grid {
            size: Self::FLOOR_SIZE,
            divisions: Self::GRID_DIVISIONS,
            height: Self::GRID_HEIGHT,
            visible: true,
            center_lines: line_mesh(&grid_lines.center, 0x888888, "grid-center"),
            lines: line_mesh(&grid_lines.lines, 0x222222, "grid"),
        };

        log::debug!(
            "Scene environment built for {}x{} container (narrow: {})",
            width,
            height,
            narrow
        );

        Self {
            camera_manager: CameraManager::new(camera, controller),
            lights: LightRig::default(),
            floor,
            grid,
            fog: Fog {
                color: Color::from_hex(Self::BACKGROUND),
                near: 16.0,
                far: 120.0,
            },
            render_settings: RenderSettings {
                background: Color::from_hex(Self::BACKGROUND),
                exposure: 1.1,
                max_pixel_ratio: if narrow { 2.0 } else { 3.0 },
            },
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera_manager.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera_manager.camera
    }

    /// Re-evaluates grid visibility against the current camera
    pub fn update_grid_visibility(&mut self, rule: GridVisibilityRule) {
        let camera = &self.camera_manager.camera;
        self.grid.visible = match rule {
            GridVisibilityRule::CameraHeight { min_height } => camera.eye.y >= min_height,
            GridVisibilityRule::ViewDirection => camera.view_direction().y <= 0.0,
        };
    }

    /// World-space height of the grid lines
    pub fn grid_translation(&self) -> Vector3<f32> {
        Vector3::new(0.0, self.grid.height, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_starts_in_side_elevation() {
        let env = SceneEnvironment::build(1200, 800, &ViewerConfig::default());
        let camera = env.camera();
        assert_eq!(camera.eye, Vector3::new(0.0, 1.25, 7.8));
        assert_eq!(camera.target, Vector3::new(0.0, 0.38, 0.0));
        assert_eq!(camera.aspect, 1.5);
        // Looking mostly horizontally, never top-down
        assert!(camera.view_direction().y.abs() < 0.5);
    }

    #[test]
    fn narrow_container_steps_camera_back() {
        let env = SceneEnvironment::build(400, 800, &ViewerConfig::default());
        assert_eq!(env.camera().eye, Vector3::new(0.0, 1.5, 13.0));
        assert_eq!(env.camera_manager.controller.rotate_speed, 1.5);
        assert_eq!(env.render_settings.max_pixel_ratio, 2.0);
    }

    #[test]
    fn light_rig_has_shadowed_key_light() {
        let env = SceneEnvironment::build(800, 600, &ViewerConfig::default());
        let casters: Vec<_> = env.lights.shadow_casters().collect();
        assert_eq!(casters.len(), 1);
        assert_eq!(casters[0].intensity, 2.5);
        assert!(env.lights.ambient.intensity > 0.0);
    }

    #[test]
    fn floor_and_grid_are_translucent() {
        let env = SceneEnvironment::build(800, 600, &ViewerConfig::default());
        assert!(env.floor.mesh.material.transparent);
        assert!(env.floor.mesh.receive_shadow);
        assert_eq!(env.grid.lines.material.opacity, 0.18);
        assert!(env.grid.lines.material.unlit);
        assert!(env.grid.height > 0.0);
    }

    #[test]
    fn grid_hides_below_floor_by_height() {
        let mut env = SceneEnvironment::build(800, 600, &ViewerConfig::default());
        let rule = GridVisibilityRule::default();
        env.update_grid_visibility(rule);
        assert!(env.grid.visible);

        env.camera_mut().set_pitch(-0.5);
        env.update_grid_visibility(rule);
        assert!(!env.grid.visible);
    }

    #[test]
    fn grid_hides_when_looking_up() {
        let mut env = SceneEnvironment::build(800, 600, &ViewerConfig::default());
        env.update_grid_visibility(GridVisibilityRule::ViewDirection);
        assert!(env.grid.visible);

        env.camera_mut().set_pitch(-0.3);
        env.update_grid_visibility(GridVisibilityRule::ViewDirection);
        assert!(!env.grid.visible);
    }
}
