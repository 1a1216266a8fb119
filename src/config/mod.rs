//! This module handles the engine's configuration, including loading and saving
//! tunables to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use rastermill::config::{self, Config, EngineSettings};
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.default_quality = Some(70);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//!
//! // Resolve against built-in defaults for engine consumption
//! let settings = EngineSettings::from_config(&config);
//! assert_eq!(settings.default_quality.value(), 70);
//! ```

pub mod defaults;

use crate::domain::editing::{Quality, Stride};
use crate::error::Result;
use crate::media::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "rastermill";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub max_file_size_mb: Option<u64>,
    #[serde(default)]
    pub preview_max_width: Option<u32>,
    #[serde(default)]
    pub preview_max_height: Option<u32>,
    #[serde(default)]
    pub history_capacity: Option<usize>,
    #[serde(default)]
    pub default_quality: Option<u8>,
    /// Export format token: `jpeg`, `png`, or `webp`.
    #[serde(default)]
    pub default_format: Option<String>,
    #[serde(default)]
    pub smart_crop_window_step: Option<u32>,
    #[serde(default)]
    pub smart_crop_sample_step: Option<u32>,
}

/// Engine tunables resolved against the built-in defaults.
///
/// Unknown or absent config values fall back to the constants in
/// [`defaults`]; out-of-range values are clamped by the newtypes.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub max_file_size: u64,
    pub preview_max_width: u32,
    pub preview_max_height: u32,
    pub history_capacity: usize,
    pub default_quality: Quality,
    pub default_format: ExportFormat,
    pub smart_crop_window_step: Stride,
    pub smart_crop_sample_step: Stride,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_file_size: defaults::MAX_FILE_SIZE_BYTES,
            preview_max_width: defaults::PREVIEW_MAX_WIDTH,
            preview_max_height: defaults::PREVIEW_MAX_HEIGHT,
            history_capacity: defaults::HISTORY_CAPACITY,
            default_quality: Quality::new(defaults::DEFAULT_QUALITY),
            default_format: ExportFormat::default(),
            smart_crop_window_step: Stride::new(defaults::SMART_CROP_WINDOW_STEP),
            smart_crop_sample_step: Stride::new(defaults::SMART_CROP_SAMPLE_STEP),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        let base = Self::default();
        Self {
            max_file_size: config
                .max_file_size_mb
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(base.max_file_size),
            preview_max_width: config
                .preview_max_width
                .filter(|w| *w > 0)
                .unwrap_or(base.preview_max_width),
            preview_max_height: config
                .preview_max_height
                .filter(|h| *h > 0)
                .unwrap_or(base.preview_max_height),
            history_capacity: config
                .history_capacity
                .filter(|c| *c >= 1)
                .unwrap_or(base.history_capacity),
            default_quality: config
                .default_quality
                .map(Quality::new)
                .unwrap_or(base.default_quality),
            default_format: config
                .default_format
                .as_deref()
                .and_then(ExportFormat::from_extension)
                .unwrap_or(base.default_format),
            smart_crop_window_step: config
                .smart_crop_window_step
                .map(Stride::new)
                .unwrap_or(base.smart_crop_window_step),
            smart_crop_sample_step: config
                .smart_crop_sample_step
                .map(Stride::new)
                .unwrap_or(base.smart_crop_sample_step),
        }
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
