//! # pairview Prelude
//!
//! Commonly used types for hosts embedding the viewer.
//!
//! ```rust
//! use pairview::prelude::*;
//!
//! let mut viewer = ModelViewer::new(HeadlessSurface::new(800, 600), ViewerConfig::default());
//! assert_eq!(viewer.set_material_color("green"), ColorPreset::Green);
//! ```

pub use crate::app::PairviewApp;
pub use crate::config::{
    CameraSettings, FitSettings, GridVisibilityRule, PairingSettings, PresentationMode,
    ViewerConfig,
};
pub use crate::error::{LoadError, RenderError, ViewerError};

pub use crate::gfx::rendering::{
    FrameHandle, HeadlessSurface, RenderEngine, RenderSurface, TickStatus,
};
pub use crate::gfx::scene::{Node, Scene, Transform};

pub use crate::viewer::{
    AssetLoader, ColorPreset, FileAssetLoader, LoadReport, ModelViewer, ViewerState,
};

// Re-export common external dependencies
pub use cgmath::{Vector3, InnerSpace, Zero};
