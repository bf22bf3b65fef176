//! GPU resource management
//!
//! Textures, uniform buffers and bind groups for the render engine.

pub mod environment_bindings;
pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use environment_bindings::EnvironmentBindings;
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUniform};
pub use material::{MaterialBindings, MaterialConfig, MaterialUBO, MaterialUniform};
pub use texture_resource::TextureResource;
