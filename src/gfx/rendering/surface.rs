//! Render targets the viewer can draw into
//!
//! [`RenderEngine`](super::RenderEngine) draws to a window through wgpu;
//! [`HeadlessSurface`] only walks the scene and records what it would draw,
//! which is all tests and offscreen tooling need.

use crate::error::RenderError;
use crate::gfx::scene::{Scene, Topology};

/// Something a scene can be presented on
pub trait RenderSurface {
    /// Current drawable size in physical pixels
    fn size(&self) -> (u32, u32);

    /// Resizes the drawable; zero-sized requests are ignored
    fn resize(&mut self, width: u32, height: u32);

    /// Draws one frame of `scene`
    fn render(&mut self, scene: &Scene) -> Result<(), RenderError>;
}

/// Statistics of the last frame a [`HeadlessSurface`] recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRecord {
    pub draw_calls: usize,
    pub triangles: usize,
    pub line_segments: usize,
}

/// Surface without a GPU
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    frames: u64,
    last_frame: FrameRecord,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: 0,
            last_frame: FrameRecord::default(),
        }
    }

    /// Number of frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> FrameRecord {
        self.last_frame
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        let mut record = FrameRecord::default();
        for item in scene.draw_items() {
            let indices = item.mesh.geometry.indices().len();
            match item.mesh.geometry.topology() {
                Topology::Triangles => record.triangles += indices / 3,
                Topology::Lines => record.line_segments += indices / 2,
            }
            record.draw_calls += 1;
        }
        self.last_frame = record;
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::environment::SceneEnvironment;

    #[test]
    fn records_environment_draws() {
        let mut surface = HeadlessSurface::new(640, 480);
        let scene = Scene::new(SceneEnvironment::build(640, 480, &ViewerConfig::default()));
        surface.render(&scene).unwrap();

        let frame = surface.last_frame();
        assert_eq!(surface.frames(), 1);
        assert_eq!(frame.draw_calls, 3);
        assert_eq!(frame.triangles, 2);
        // 301 lines per axis, 2 of them through the origin
        assert_eq!(frame.line_segments, 2 * 301);
    }

    #[test]
    fn ignores_zero_size() {
        let mut surface = HeadlessSurface::new(640, 480);
        surface.resize(0, 300);
        assert_eq!(surface.size(), (640, 480));
        surface.resize(300, 200);
        assert_eq!(surface.size(), (300, 200));
    }
}
