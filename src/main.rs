use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sheen::{
    assets::LoadPolicy,
    config::{Preset, ShowcaseConfig},
    ShowcaseApp,
};

#[derive(Parser, Debug)]
#[command(name = "sheen")]
#[command(about = "Standard material showcase: three primitives, HDR environments, live controls")]
struct Cli {
    /// Scene preset; overrides the scene from --config
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding textures/ and environmentMap/
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Environment to show first, by catalog name (e.g. "Forest")
    #[arg(long)]
    environment: Option<String>,

    /// Window size in logical pixels, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// How racing environment loads are reconciled
    #[arg(long, value_enum)]
    load_policy: Option<LoadPolicy>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = width.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let height = height.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if width == 0 || height == 0 {
        return Err("window size must be non-zero".to_string());
    }
    Ok((width, height))
}

impl Cli {
    fn into_config(&self) -> Result<ShowcaseConfig> {
        let mut config = match &self.config {
            Some(path) => ShowcaseConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ShowcaseConfig::default(),
        };
        if let Some(preset) = self.preset {
            config = config.with_preset(preset);
        }
        if let Some(assets) = &self.assets {
            config = config.with_assets_root(assets.clone());
        }
        if let Some(environment) = &self.environment {
            config = config.with_initial_environment(environment.as_str());
        }
        if let Some((width, height)) = self.size {
            config = config.with_window_size(width, height);
        }
        if let Some(policy) = self.load_policy {
            config = config.with_load_policy(policy);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.into_config()?;

    if let Some(path) = &cli.write_config {
        config
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote configuration to {}", path.display());
        return Ok(());
    }
    log::info!(
        "Starting with {} objects, assets at {}",
        config.scene.objects.len(),
        config.assets_root.display()
    );

    let app = ShowcaseApp::new(config)?;
    app.run()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_width_by_height() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
    }

    #[test]
    fn flags_layer_over_the_defaults() {
        let cli = Cli::parse_from([
            "sheen",
            "--preset",
            "basic",
            "--size",
            "640x480",
            "--load-policy",
            "latest-request-wins",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert_eq!(config.environment.policy, LoadPolicy::LatestRequestWins);
    }
}
