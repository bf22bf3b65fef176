//! # User Interface Module
//!
//! Dear ImGui overlay for the showcase.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, input capture
//! - [`panel`] - the "Material" panel with roughness, metalness and environment
//!
//! While ImGui wants the mouse or keyboard, camera input is not processed.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{material_panel, PanelInfo, PanelSnapshot};
