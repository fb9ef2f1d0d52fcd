//! Keeps the camera and render surface in step with the container size

use cgmath::InnerSpace;

use crate::config::ViewerConfig;
use crate::gfx::environment::SceneEnvironment;
use crate::gfx::rendering::surface::RenderSurface;

/// Reacts to container resizes
///
/// Besides the aspect ratio, the responder tracks whether the container is
/// narrow. Crossing the threshold steps the orbit distance between the
/// regular and the narrow camera placement while keeping the orbit angles.
#[derive(Debug, Clone)]
pub struct ViewportResponder {
    narrow_width: u32,
    regular_distance: f32,
    narrow_distance: f32,
    regular_rotate_speed: f32,
    narrow_rotate_speed: f32,
    narrow: bool,
}

impl ViewportResponder {
    pub fn new(config: &ViewerConfig, initial_width: u32) -> Self {
        let camera = &config.camera;
        Self {
            narrow_width: config.narrow_width,
            regular_distance: (camera.position - camera.target).magnitude(),
            narrow_distance: (camera.narrow_position - camera.target).magnitude(),
            regular_rotate_speed: camera.rotate_speed,
            narrow_rotate_speed: camera.narrow_rotate_speed,
            narrow: config.is_narrow(initial_width),
        }
    }

    pub fn is_narrow(&self) -> bool {
        self.narrow
    }

    /// Applies a new container size; returns false when the size was ignored
    pub fn on_resize<S: RenderSurface>(
        &mut self,
        environment: &mut SceneEnvironment,
        surface: &mut S,
        width: u32,
        height: u32,
    ) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-size resize {}x{}", width, height);
            return false;
        }

        let camera = environment.camera_mut();
        camera.resize_projection(width, height);

        let narrow = width < self.narrow_width;
        if narrow != self.narrow {
            self.narrow = narrow;
            let (distance, rotate_speed, pixel_ratio) = if narrow {
                (self.narrow_distance, self.narrow_rotate_speed, 2.0)
            } else {
                (self.regular_distance, self.regular_rotate_speed, 3.0)
            };
            camera.set_distance(distance);
            environment.camera_manager.controller.rotate_speed = rotate_speed;
            environment.render_settings.max_pixel_ratio = pixel_ratio;
            log::info!(
                "Viewport {} ({}px wide), orbit distance {:.2}",
                if narrow { "narrow" } else { "regular" },
                width,
                distance
            );
        }

        surface.resize(width, height);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::surface::HeadlessSurface;

    fn setup(width: u32, height: u32) -> (ViewportResponder, SceneEnvironment, HeadlessSurface) {
        let config = ViewerConfig::default();
        (
            ViewportResponder::new(&config, width),
            SceneEnvironment::build(width, height, &config),
            HeadlessSurface::new(width, height),
        )
    }

    #[test]
    fn aspect_follows_container_exactly() {
        let (mut responder, mut env, mut surface) = setup(1200, 800);
        for (w, h) in [(1000, 500), (1920, 1080), (801, 799)] {
            assert!(responder.on_resize(&mut env, &mut surface, w, h));
            assert_eq!(env.camera().aspect, w as f32 / h as f32);
            assert_eq!(surface.size(), (w, h));
        }
    }

    #[test]
    fn regular_resize_leaves_camera_in_place() {
        let (mut responder, mut env, mut surface) = setup(1200, 800);
        let eye = env.camera().eye;
        responder.on_resize(&mut env, &mut surface, 1000, 700);
        assert_eq!(env.camera().eye, eye);
    }

    #[test]
    fn zero_size_is_ignored() {
        let (mut responder, mut env, mut surface) = setup(1200, 800);
        assert!(!responder.on_resize(&mut env, &mut surface, 0, 0));
        assert_eq!(env.camera().aspect, 1.5);
        assert_eq!(surface.size(), (1200, 800));
    }

    #[test]
    fn narrow_crossing_steps_distance_and_back() {
        let (mut responder, mut env, mut surface) = setup(1200, 800);
        let regular = env.camera().distance;

        responder.on_resize(&mut env, &mut surface, 500, 800);
        assert!(responder.is_narrow());
        assert!(env.camera().distance > regular);
        assert_eq!(env.camera_manager.controller.rotate_speed, 1.5);

        // Staying narrow does not move the camera again
        let eye = env.camera().eye;
        responder.on_resize(&mut env, &mut surface, 520, 800);
        assert_eq!(env.camera().eye, eye);

        responder.on_resize(&mut env, &mut surface, 1200, 800);
        assert!(!responder.is_narrow());
        assert!((env.camera().distance - regular).abs() < 1e-4);
        assert_eq!(env.camera_manager.controller.rotate_speed, 1.0);
    }
}
