//! Showcase configuration
//!
//! Everything that shapes a run: window, asset root, the scene preset, camera
//! and the environment load policy. Built-in defaults mirror the richer
//! preset; a TOML file (see [`ShowcaseConfig::load`]) and the command line can
//! override them.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    assets::LoadPolicy,
    error::ConfigError,
    gfx::{camera::CameraConfig, geometry::PrimitiveDescriptor, resources::MaterialConfig},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sheen".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// One mesh in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub name: String,
    pub primitive: PrimitiveDescriptor,
    #[serde(default)]
    pub position: [f32; 3],
    /// Radians per second around X and Y
    pub rotation_rates: [f32; 2],
}

impl ObjectConfig {
    fn new(name: &str, primitive: PrimitiveDescriptor, x: f32, rotation_rates: [f32; 2]) -> Self {
        Self {
            name: name.to_string(),
            primitive,
            position: [x, 0.0, 0.0],
            rotation_rates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Basic,
    Richer,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Preset::Basic),
            "richer" => Ok(Preset::Richer),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Objects, the shared material and the environment shown first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub objects: Vec<ObjectConfig>,
    #[serde(default)]
    pub material: MaterialConfig,
    #[serde(default)]
    pub initial_environment: Option<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::richer()
    }
}

impl SceneConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Basic => Self::basic(),
            Preset::Richer => Self::richer(),
        }
    }

    /// Coarse meshes, untextured material, no environment
    pub fn basic() -> Self {
        Self {
            objects: vec![
                ObjectConfig::new(
                    "plane",
                    PrimitiveDescriptor::Plane {
                        width: 1.0,
                        height: 1.0,
                        width_segments: 1,
                        height_segments: 1,
                    },
                    0.0,
                    [0.3, 0.3],
                ),
                ObjectConfig::new(
                    "sphere",
                    PrimitiveDescriptor::Sphere {
                        radius: 0.5,
                        width_segments: 16,
                        height_segments: 16,
                    },
                    -1.4,
                    [0.3, 0.3],
                ),
                ObjectConfig::new(
                    "torus",
                    PrimitiveDescriptor::Torus {
                        radius: 0.3,
                        tube: 0.2,
                        radial_segments: 16,
                        tubular_segments: 32,
                    },
                    1.4,
                    [0.3, 0.3],
                ),
            ],
            material: MaterialConfig::basic(),
            initial_environment: None,
        }
    }

    /// Finely tessellated meshes, door-textured material, HDR environment
    pub fn richer() -> Self {
        Self {
            objects: vec![
                ObjectConfig::new(
                    "plane",
                    PrimitiveDescriptor::Plane {
                        width: 1.0,
                        height: 1.0,
                        width_segments: 100,
                        height_segments: 100,
                    },
                    0.0,
                    [0.4, 0.4],
                ),
                ObjectConfig::new(
                    "sphere",
                    PrimitiveDescriptor::Sphere {
                        radius: 0.5,
                        width_segments: 64,
                        height_segments: 64,
                    },
                    -1.5,
                    [0.6, 0.3],
                ),
                ObjectConfig::new(
                    "torus",
                    PrimitiveDescriptor::Torus {
                        radius: 0.3,
                        tube: 0.2,
                        radial_segments: 64,
                        tubular_segments: 128,
                    },
                    1.5,
                    [0.4, 0.8],
                ),
            ],
            material: MaterialConfig::richer(),
            initial_environment: Some("City Center".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub policy: LoadPolicy,
    /// Ambient light used while no environment map is installed
    pub fallback_ambient: [f32; 3],
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            policy: LoadPolicy::default(),
            fallback_ambient: [0.5, 0.5, 0.5],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub window: WindowConfig,
    pub assets_root: PathBuf,
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub environment: EnvironmentConfig,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets_root: PathBuf::from("static"),
            scene: SceneConfig::default(),
            camera: CameraConfig::default(),
            environment: EnvironmentConfig::default(),
        }
    }
}

impl ShowcaseConfig {
    /// Reads a TOML file; missing sections take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.scene = SceneConfig::preset(preset);
        self
    }

    pub fn with_assets_root(mut self, assets_root: impl Into<PathBuf>) -> Self {
        self.assets_root = assets_root.into();
        self
    }

    pub fn with_initial_environment(mut self, name: impl Into<String>) -> Self {
        self.scene.initial_environment = Some(name.into());
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.environment.policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureKey;

    #[test]
    fn presets_round_trip_through_toml() {
        for preset in [Preset::Basic, Preset::Richer] {
            let config = ShowcaseConfig::default().with_preset(preset);
            let text = config.to_toml_string().unwrap();
            let parsed = ShowcaseConfig::from_toml_str(&text).unwrap();
            assert_eq!(parsed, config, "{preset:?} did not survive TOML");
        }
    }

    #[test]
    fn saved_file_loads_back() {
        let path = std::env::temp_dir().join(format!("sheen-config-{}.toml", std::process::id()));
        let config = ShowcaseConfig::default()
            .with_preset(Preset::Basic)
            .with_window_size(1024, 768)
            .with_load_policy(LoadPolicy::LatestRequestWins);

        config.save(&path).unwrap();
        let loaded = ShowcaseConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = ShowcaseConfig::from_toml_str("").unwrap();
        assert_eq!(config, ShowcaseConfig::default());
        assert_eq!(config.scene, SceneConfig::richer());
        assert_eq!(config.assets_root, PathBuf::from("static"));
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let config = ShowcaseConfig::from_toml_str(
            r#"
            assets_root = "assets"

            [window]
            width = 640

            [environment]
            policy = "latest_request_wins"
            "#,
        )
        .unwrap();

        assert_eq!(config.assets_root, PathBuf::from("assets"));
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.environment.policy, LoadPolicy::LatestRequestWins);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn scene_objects_can_be_described_in_toml() {
        let config = ShowcaseConfig::from_toml_str(
            r#"
            [scene]
            initial_environment = "Forest"

            [[scene.objects]]
            name = "ball"
            primitive = { kind = "sphere", radius = 1.0, width_segments = 8, height_segments = 8 }
            position = [0.0, 1.0, 0.0]
            rotation_rates = [0.1, 0.2]

            [scene.material]
            roughness = 0.4
            color_map = "door_color"
            "#,
        )
        .unwrap();

        assert_eq!(config.scene.objects.len(), 1);
        assert_eq!(config.scene.objects[0].primitive.kind(), "sphere");
        assert_eq!(config.scene.material.roughness, 0.4);
        assert_eq!(config.scene.material.color_map, Some(TextureKey::DoorColor));
        assert_eq!(config.scene.initial_environment.as_deref(), Some("Forest"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            ShowcaseConfig::from_toml_str("window = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn basic_preset_matches_the_plain_scene() {
        let scene = SceneConfig::basic();
        let positions: Vec<f32> = scene.objects.iter().map(|o| o.position[0]).collect();
        assert_eq!(positions, vec![0.0, -1.4, 1.4]);
        assert!(scene.objects.iter().all(|o| o.rotation_rates == [0.3, 0.3]));
        assert_eq!(scene.initial_environment, None);
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!("basic".parse::<Preset>().unwrap(), Preset::Basic);
        assert_eq!("richer".parse::<Preset>().unwrap(), Preset::Richer);
        assert!(matches!(
            "fancy".parse::<Preset>(),
            Err(ConfigError::UnknownPreset(name)) if name == "fancy"
        ));
    }
}
