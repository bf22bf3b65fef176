//! WGPU utility functions and helpers
//!
//! Small builders and wrappers around bind groups and uniform buffers so the
//! rendering code reads as a list of bindings rather than raw descriptors.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::UniformBuffer;
