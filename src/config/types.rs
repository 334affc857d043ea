//! Configuration data structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Capture defaults applied when the CLI flags are omitted.
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Default output format: "png", "jpeg" or "webp".
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Default quality percent, 10-100.
    #[serde(default = "default_quality")]
    pub default_quality: u8,

    /// Custom output width in pixels, 10-2000. Only applied together with
    /// `custom_height`.
    #[serde(default)]
    pub custom_width: Option<u32>,

    /// Custom output height in pixels, 10-2000.
    #[serde(default)]
    pub custom_height: Option<u32>,

    /// Default interval between repeated captures, in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            default_quality: default_quality(),
            custom_width: None,
            custom_height: None,
            interval_secs: default_interval(),
        }
    }
}

/// Where and how gallery records are kept.
#[derive(Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the gallery blob path; defaults to
    /// `~/.local/share/snapgrab/gallery.json`.
    #[serde(default)]
    pub gallery_path: Option<PathBuf>,

    /// chrono format template for generated screenshot names.
    #[serde(default = "default_name_template")]
    pub name_template: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            gallery_path: None,
            name_template: default_name_template(),
        }
    }
}

/// User-facing feedback preferences.
#[derive(Debug, Serialize, Deserialize)]
pub struct UiConfig {
    /// Emit a desktop notification per capture outcome.
    #[serde(default = "default_true")]
    pub notifications: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notifications: default_true(),
        }
    }
}

fn default_format() -> String {
    "png".to_string()
}

fn default_quality() -> u8 {
    90
}

fn default_interval() -> u64 {
    5
}

fn default_name_template() -> String {
    "screenshot_%Y-%m-%d_%H%M%S".to_string()
}

fn default_true() -> bool {
    true
}
