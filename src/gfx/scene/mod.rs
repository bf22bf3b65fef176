//! # Scene Management Module
//!
//! The three spinning objects and the single material they share.
//!
//! - [`Scene`] - objects, shared material, per-frame animation and draw list
//! - [`SceneObject`] - a mesh at a fixed position with per-axis rotation rates
//! - [`Vertex3D`] - GPU vertex with position, normal and texture coordinates

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Mesh, RotationRates, SceneObject};
pub use scene::{DrawCommand, Scene, SceneStatistics};
pub use vertex::Vertex3D;
