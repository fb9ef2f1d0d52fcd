//! pairview
//!
//! Real-time 3D product preview built on wgpu and winit: load a single shoe
//! asset, present it as a mirrored pair fitted to a canonical volume, and
//! recolor it live.
//!
//! ```no_run
//! use pairview::prelude::*;
//!
//! let surface = HeadlessSurface::new(1200, 800);
//! let mut viewer = ModelViewer::new(surface, ViewerConfig::default());
//! let report = pollster::block_on(viewer.load_asset("shoe.glb"))?;
//! viewer.set_material_color("red");
//! println!("scale {}", report.scale);
//! # Ok::<(), pairview::error::ViewerError>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::PairviewApp;
pub use viewer::ModelViewer;
