//! WGPU utility functions and helpers
//!
//! Bind group builders and uniform buffers, including the dynamically
//! offset buffer used for per-draw object data.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

// Re-export main types
pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use binding_types::*;
pub use uniform_buffer::{aligned_stride, DynamicUniformBuffer, UniformBuffer};
