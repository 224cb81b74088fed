//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/gridclick/config.json`.
//! Every section is optional; a minimal `{}` file is valid and all values
//! fall back to their compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "grid": { "size": 26 },
//!   "overlay": {
//!     "alpha": 0.6,
//!     "background": "black",
//!     "grid_color": "white",
//!     "font": "Arial",
//!     "font_size": 12
//!   },
//!   "screen": { "width": 1920, "height": 1080 },
//!   "socket_path": "/run/user/1000/gridclick.sock"
//! }
//! ```

use crate::label::DEFAULT_GRID_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,

    /// Appearance hints passed through to the overlay renderer.
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Screen size used when the pointer backend cannot report one.
    #[serde(default)]
    pub screen: ScreenConfig,

    /// Where the key-event socket is bound.  Defaults to
    /// `$XDG_RUNTIME_DIR/gridclick.sock`.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns and rows.  At most 26; only 26 gives every
    /// two-letter label a cell.
    pub size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Overlay appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Window opacity in `[0.0, 1.0]`.
    pub alpha: f64,
    pub background: String,
    /// Colour of cell outlines and label letters.
    pub grid_color: String,
    pub font: String,
    /// Label font size in points.
    pub font_size: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            background: "black".into(),
            grid_color: "white".into(),
            font: "Arial".into(),
            font_size: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
