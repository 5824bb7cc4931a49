//! Boot Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line: `--frames 600 --assets ./assets --seed 7`
//! 2. Environment variables: `ORCHARD_FRAMES`, `ORCHARD_ASSETS`, `ORCHARD_SEED`
//! 3. Config file: `orchard.toml` (or `ORCHARD_CONFIG`)
//! 4. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! frames = 1800
//! snapshot_every = 60
//!
//! [assets]
//! asset_dir = "assets"
//!
//! [banner]
//! duration = 3.0
//!
//! [scene.spawn]
//! interval_secs = 2.5
//! ```

use orchard_asset::PrototypeServerConfig;
use orchard_hud::BannerConfig;
use orchard_scene::SceneConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "orchard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing value for {0}")]
    MissingValue(String),
}

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frames to simulate before shutting down
    pub frames: u64,
    /// Host time per frame, in seconds
    pub frame_time: f32,
    /// Log a frame snapshot every N frames; 0 disables
    pub snapshot_every: u64,
    pub assets: PrototypeServerConfig,
    pub banner: BannerConfig,
    pub scene: SceneConfig,
    /// File the config was read from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_time: 1.0 / 60.0,
            snapshot_every: 60,
            assets: PrototypeServerConfig::default(),
            banner: BannerConfig::default(),
            scene: SceneConfig::default(),
            config_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load from all sources
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ORCHARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            let loaded = Self::load_from_file(&path)?;
            log::info!("Loaded config from {}", path.display());
            loaded
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(std::env::args().skip(1))?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Override from `ORCHARD_*` variables
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(frames) = var("ORCHARD_FRAMES") {
            self.frames = parse_value("ORCHARD_FRAMES", &frames)?;
        }
        if let Some(dir) = var("ORCHARD_ASSETS").filter(|d| !d.is_empty()) {
            self.assets.asset_dir = PathBuf::from(dir);
        }
        if let Some(seed) = var("ORCHARD_SEED") {
            self.scene.spawn.seed = Some(parse_value("ORCHARD_SEED", &seed)?);
        }
        Ok(())
    }

    /// Override from command line flags. Unknown arguments are ignored.
    pub fn apply_args<I, S>(&mut self, args: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };

            match flag.as_str() {
                "--frames" | "--assets" | "--seed" => {
                    let value = inline
                        .or_else(|| args.next())
                        .ok_or_else(|| ConfigError::MissingValue(flag.clone()))?;
                    match flag.as_str() {
                        "--frames" => self.frames = parse_value(&flag, &value)?,
                        "--assets" => self.assets.asset_dir = PathBuf::from(value),
                        _ => self.scene.spawn.seed = Some(parse_value(&flag, &value)?),
                    }
                }
                other => log::debug!("Ignoring argument {}", other),
            }
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Runtime Configuration:");
        log::info!("  Frames: {} at {:.4}s", self.frames, self.frame_time);
        log::info!("  Assets: {}", self.assets.asset_dir.display());
        log::info!(
            "  Prototypes: {} / {}",
            self.scene.assets.object,
            self.scene.assets.container
        );
        if let Some(seed) = self.scene.spawn.seed {
            log::info!("  Spawn seed: {}", seed);
        }
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path.display());
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
