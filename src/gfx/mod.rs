//! # Graphics Module
//!
//! Everything the viewer draws with: camera, scene graph, materials, the
//! static environment and the render surfaces.
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped drag controls
//! - **Scene Management** ([`scene`]) - Node hierarchy and the live stage
//! - **Environment** ([`environment`]) - Lights, floor, grid and fog
//! - **Rendering** ([`rendering`]) - wgpu engine, headless surface, frame loop
//! - **Resources** ([`resources`]) - Materials and GPU uniform bindings
//!
//! ```no_run
//! use pairview::config::ViewerConfig;
//! use pairview::gfx::{environment::SceneEnvironment, scene::Scene};
//!
//! let environment = SceneEnvironment::build(1200, 800, &ViewerConfig::default());
//! let mut scene = Scene::new(environment);
//! scene.show_placeholder();
//! ```

pub mod bounds;
pub mod camera;
pub mod environment;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
