//! Error types shared across the showcase
//!
//! Only startup can fail hard. Everything that goes wrong once the frame loop
//! is running (missing textures, bad HDR files, unknown catalog keys) is
//! logged by the component that hit it and the loop carries on.

use thiserror::Error;

use crate::assets::AssetError;

/// Top-level error for building and running the showcase
#[derive(Debug, Error)]
pub enum ShowcaseError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Errors raised while loading a `ShowcaseConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown preset '{0}' (expected 'basic' or 'richer')")]
    UnknownPreset(String),
}

pub type Result<T> = std::result::Result<T, ShowcaseError>;
