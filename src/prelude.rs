//! # Sheen Prelude
//!
//! Commonly used types in one import:
//!
//! ```no_run
//! use sheen::prelude::*;
//!
//! fn main() -> Result<(), ShowcaseError> {
//!     let config = ShowcaseConfig::default().with_preset(Preset::Basic);
//!     ShowcaseApp::new(config)?.run()
//! }
//! ```

pub use crate::app::ShowcaseApp;
pub use crate::default;
pub use crate::error::{ConfigError, ShowcaseError};

pub use crate::config::{Preset, SceneConfig, ShowcaseConfig};
pub use crate::context::SceneContext;
pub use crate::parameters::{ParameterEdit, ParameterStore};

pub use crate::animation::{AnimationDriver, FrameRenderer, FrameScheduler};
pub use crate::assets::{EnvironmentCatalog, EnvironmentLoader, LoadPolicy};

pub use crate::gfx::camera::CameraManager;
pub use crate::gfx::resources::MaterialConfig;
pub use crate::gfx::scene::Scene;

pub use imgui::Ui;
