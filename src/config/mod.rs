//! Configuration file support.
//!
//! Settings live at `~/.config/snapgrab/config.toml`. If no config file
//! exists, sensible defaults are used automatically; loaded values are
//! validated and clamped to acceptable ranges.
//!
//! # Example TOML
//! ```toml
//! [capture]
//! default_format = "png"
//! default_quality = 90
//! interval_secs = 10
//!
//! [storage]
//! name_template = "screenshot_%Y-%m-%d_%H%M%S"
//!
//! [ui]
//! notifications = true
//! ```

pub mod types;

pub use types::{CaptureConfig, StorageConfig, UiConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::capture::ImageFormat;

/// Bounds for user-specified custom output dimensions, in pixels.
pub const MIN_DIMENSION: u32 = 10;
pub const MAX_DIMENSION: u32 = 2000;

/// Bounds for the quality percentage.
pub const MIN_QUALITY: u8 = 10;
pub const MAX_QUALITY: u8 = 100;

/// Root configuration, deserialized from the TOML file.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    fn validate_and_clamp(&mut self) {
        if ImageFormat::from_str(&self.capture.default_format).is_err() {
            warn!(
                "Invalid default_format '{}', falling back to 'png'",
                self.capture.default_format
            );
            self.capture.default_format = "png".to_string();
        }

        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.capture.default_quality) {
            warn!(
                "Invalid default_quality {}, clamping to {}-{} range",
                self.capture.default_quality, MIN_QUALITY, MAX_QUALITY
            );
            self.capture.default_quality =
                self.capture.default_quality.clamp(MIN_QUALITY, MAX_QUALITY);
        }

        for side in [&mut self.capture.custom_width, &mut self.capture.custom_height] {
            if let Some(value) = side {
                if !(MIN_DIMENSION..=MAX_DIMENSION).contains(value) {
                    warn!(
                        "Invalid custom dimension {}, clamping to {}-{} range",
                        value, MIN_DIMENSION, MAX_DIMENSION
                    );
                    *value = (*value).clamp(MIN_DIMENSION, MAX_DIMENSION);
                }
            }
        }

        if self.capture.interval_secs == 0 {
            warn!("Invalid interval_secs 0, using 1");
            self.capture.interval_secs = 1;
        }

        if self.storage.name_template.trim().is_empty() {
            warn!("Empty name_template, restoring default");
            self.storage.name_template = StorageConfig::default().name_template;
        }
    }

    /// Default output format, already validated.
    pub fn default_format(&self) -> ImageFormat {
        ImageFormat::from_str(&self.capture.default_format).unwrap_or(ImageFormat::Png)
    }

    /// Path of the gallery blob: the configured override, or
    /// `<data_dir>/snapgrab/gallery.json` when a data directory resolves.
    pub fn gallery_blob_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.storage.gallery_path {
            return Some(path.clone());
        }
        dirs::data_dir().map(|dir| dir.join("snapgrab").join("gallery.json"))
    }

    /// Returns the path to the configuration file,
    /// `~/.config/snapgrab/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not find config directory")?
            .join("snapgrab");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    ///
    /// # Errors
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {config:?}");

        Ok(config)
    }

    /// Saves the current configuration to the config file, creating the
    /// parent directory if needed.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("failed to serialize config")?;

        fs::write(&config_path, config_str)
            .with_context(|| format!("failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.default_format(), ImageFormat::Png);
        assert_eq!(config.capture.default_quality, 90);
        assert!(config.ui.notifications);
        assert!(config.storage.name_template.contains("%Y"));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let mut config = Config::default();
        config.capture.default_format = "bmp".to_string();
        config.capture.default_quality = 3;
        config.capture.custom_width = Some(5000);
        config.capture.custom_height = Some(2);
        config.capture.interval_secs = 0;
        config.storage.name_template = "  ".to_string();

        config.validate_and_clamp();

        assert_eq!(config.capture.default_format, "png");
        assert_eq!(config.capture.default_quality, MIN_QUALITY);
        assert_eq!(config.capture.custom_width, Some(MAX_DIMENSION));
        assert_eq!(config.capture.custom_height, Some(MIN_DIMENSION));
        assert_eq!(config.capture.interval_secs, 1);
        assert!(!config.storage.name_template.trim().is_empty());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let mut config: Config = toml::from_str(
            r#"
            [capture]
            default_format = "jpeg"
            default_quality = 75
            "#,
        )
        .unwrap();
        config.validate_and_clamp();

        assert_eq!(config.default_format(), ImageFormat::Jpeg);
        assert_eq!(config.capture.default_quality, 75);
        // Untouched sections keep their defaults.
        assert!(config.ui.notifications);
        assert_eq!(config.capture.interval_secs, 5);
    }
}
