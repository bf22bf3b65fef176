//! Sheen
//!
//! A physically based material showcase on wgpu and winit: a plane, a sphere
//! and a torus share one standard material, lit by a selectable HDR
//! environment, with a damped orbit camera and a live ImGui control panel.

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod context;
pub mod error;
pub mod gfx;
pub mod parameters;
pub mod prelude;
pub mod ui;
pub mod viewport;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ShowcaseApp;
pub use error::{Result, ShowcaseError};

/// Creates the showcase with the built-in defaults
pub fn default() -> Result<ShowcaseApp> {
    ShowcaseApp::new(config::ShowcaseConfig::default())
}
