//! Configuration management
//!
//! Settings are layered: the defaults embedded at build time, then an
//! optional user file from the config directory in any of the supported
//! formats. The demo session runs without any user configuration.

use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;

use crate::engine::PagingConfig;
use crate::utils;

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

/// Geometry of the simulated render surface
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Extent each rendered message occupies
    pub item_extent: f64,
    /// Extent of the visible viewport
    pub viewport_extent: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            item_extent: 100.0,
            viewport_extent: 400.0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        let mut default_config: Config = json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))?;
        let data_dir = utils::get_data_dir();
        let config_dir = utils::get_config_dir();

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut builder = config::Config::builder()
            .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("_config_dir", config_dir.to_string_lossy().to_string())?;
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(*format)
                    .required(false),
            );
            if config_dir.join(file).exists() {
                found_config = true
            }
        }

        // Without a user file the embedded defaults are the configuration
        let mut cfg = if found_config {
            builder.build()?.try_deserialize::<Self>()?
        } else {
            default_config.config._data_dir = data_dir;
            default_config.config._config_dir = config_dir;
            default_config
        };

        if cfg.paging.batch_size == 0 {
            return Err(ConfigError::Message(String::from(
                "paging.batch_size must be at least 1",
            )));
        }
        cfg.paging.threshold = cfg.paging.threshold.clamp(0.0, 1.0);

        Ok(cfg)
    }
}
