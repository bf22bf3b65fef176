//! # Graphics Module
//!
//! Everything that touches the GPU or produces data for it.
//!
//! - **Camera** ([`camera`]) - damped orbit camera and its input controller
//! - **Geometry** ([`geometry`]) - plane, sphere and torus generators
//! - **Rendering** ([`rendering`]) - surface, pipelines and the frame pass
//! - **Resources** ([`resources`]) - material, textures, uniform bind groups
//! - **Scene** ([`scene`]) - the spinning objects and their shared material

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
