//! # Asset Registry
//!
//! Everything the showcase reads from disk: the environment catalog, the
//! texture set loaded once at startup, and the asynchronous HDR environment
//! loader.
//!
//! Asset failures are never fatal. Textures fall back to 1×1 placeholders and
//! a failed environment load leaves the previous environment installed.

pub mod catalog;
pub mod environment;
pub mod textures;

use std::path::PathBuf;

use thiserror::Error;

pub use catalog::EnvironmentCatalog;
pub use environment::{
    EnvironmentImage, EnvironmentLoader, EnvironmentSlot, LoadExecutor, LoadPolicy, LoadTicket,
    ThreadExecutor, MAX_ENVIRONMENT_DIMENSION,
};
pub use textures::{ColorSpace, DecodedTexture, TextureFilter, TextureKey, TextureSet};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} is {width}x{height}, larger than the {max} texel limit")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

impl AssetError {
    /// Wraps an `image` error, keeping IO failures distinguishable from bad data
    pub(crate) fn from_image(path: impl Into<PathBuf>, error: image::ImageError) -> Self {
        let path = path.into();
        match error {
            image::ImageError::IoError(source) => AssetError::Io { path, source },
            source => AssetError::Decode { path, source },
        }
    }
}
