//! Studio configuration module.
//!
//! Handles loading, validating, and merging `shotframe.toml`. Stock defaults
//! are the base layer; a user file overrides only the keys it names.
//!
//! ## Config File Location
//!
//! `shotframe.toml` is read from the working directory, or from the path
//! given with `--config`:
//!
//! ```text
//! project/
//! ├── shotframe.toml          # Overrides stock defaults
//! └── screenshots/
//!     ├── home.png
//!     └── settings.png
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! platform = "apple"        # apple | android
//! mode = "rectangle"        # rectangle | frame
//! fit = "fit"               # fit | autofit | stretch
//!
//! [adjustments]
//! brightness = 100          # percent, 100 = unchanged
//! contrast = 100
//! saturation = 100
//! sharpness = 0             # 0-100, 0 = off
//!
//! [chassis]
//! apple = "#1c1c1e"         # FRAME body color per platform
//! android = "#202124"
//!
//! [processing]
//! max_processes = 4         # Max parallel renders (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Framed Android mockups by default
//! [defaults]
//! platform = "android"
//! mode = "frame"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::devices::{Platform, default_chassis_color};
use crate::session::EditState;
use crate::types::{CropArea, ExportMode, FitMode, ImageAdjustments, Rgb};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file name looked up in a directory.
pub const CONFIG_FILENAME: &str = "shotframe.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Studio configuration loaded from `shotframe.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Platform, export mode and fit used when the CLI doesn't say otherwise.
    pub defaults: DefaultsConfig,
    /// Tone and sharpening applied to every render.
    pub adjustments: ImageAdjustments,
    /// Chassis body colors for FRAME exports.
    pub chassis: ChassisConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let adj = &self.adjustments;
        let percentages = [
            ("brightness", adj.brightness),
            ("contrast", adj.contrast),
            ("saturation", adj.saturation),
        ];
        for (name, value) in percentages {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "adjustments.{name} must be a non-negative number"
                )));
            }
        }
        if !adj.sharpness.is_finite() || !(0.0..=100.0).contains(&adj.sharpness) {
            return Err(ConfigError::Validation(
                "adjustments.sharpness must be 0-100".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Chassis color configured for a platform.
    pub fn chassis_color(&self, platform: Platform) -> Rgb {
        match platform {
            Platform::Apple => self.chassis.apple,
            Platform::Android => self.chassis.android,
        }
    }

    /// Initial edit state for a session on `platform`.
    pub fn edit_state(&self, platform: Platform) -> EditState {
        EditState {
            crop: CropArea::FULL,
            adjustments: self.adjustments,
            fit: self.defaults.fit,
            mode: self.defaults.mode,
            chassis_color: Some(self.chassis_color(platform)),
        }
    }
}

/// Default capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub platform: Platform,
    pub mode: ExportMode,
    pub fit: FitMode,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Apple,
            mode: ExportMode::Rectangle,
            fit: FitMode::Fit,
        }
    }
}

/// Chassis body color per platform, as `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChassisConfig {
    pub apple: Rgb,
    pub android: Rgb,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            apple: default_chassis_color(Platform::Apple),
            android: default_chassis_color(Platform::Android),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel renders.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(StudioConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load `shotframe.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    load_raw_file(&config_path).map(Some)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StudioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StudioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `shotframe.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<StudioConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(dir)?)
}

/// Load config from an explicit file path. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<StudioConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, Some(load_raw_file(path)?))
}

/// Returns a fully-commented stock `shotframe.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Shotframe Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to your screenshots as shotframe.toml, or pass
# --config <path>. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Capture defaults
# ---------------------------------------------------------------------------
[defaults]
# Store ecosystem to render for: "apple" or "android".
platform = "apple"

# "rectangle" renders the screenshot edge to edge.
# "frame" draws a device chassis around it.
mode = "rectangle"

# How the screenshot fills the device screen when aspect ratios differ:
#   "fit"     letterbox, nothing is cut off
#   "autofit" cover, overflow is cropped (tablets keep phone-sized UI)
#   "stretch" force to the screen size
fit = "fit"

# ---------------------------------------------------------------------------
# Image adjustments
# ---------------------------------------------------------------------------
[adjustments]
# Percentages; 100 leaves the image unchanged.
brightness = 100.0
contrast = 100.0
saturation = 100.0

# Sharpening strength 0-100. 0 disables the sharpening pass.
sharpness = 0.0

# ---------------------------------------------------------------------------
# Chassis colors (frame mode)
# ---------------------------------------------------------------------------
[chassis]
apple = "#1c1c1e"         # Black Titanium
android = "#202124"       # Obsidian

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel renders.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
