//! Core rendering functionality
//!
//! Render surfaces, the wgpu render engine and the frame loop.

pub mod frame_loop;
pub mod pipeline_manager;
pub mod render_engine;
pub mod render_pass_ext;
pub mod surface;

// Re-export main types
pub use frame_loop::{FrameHandle, FrameLoop, TickStatus};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use surface::{FrameRecord, HeadlessSurface, RenderSurface};
