//! Tool configuration module.
//!
//! Handles loading, validating, and merging `boxer.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to change, and
//! command-line flags override both.
//!
//! ## Config File Location
//!
//! `boxer.toml` is picked up from the working directory. A different file can
//! be named with `--config <FILE>`, in which case it must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [mosaic]
//! aspect_ratio = "16:9"     # Target ratio of the whole mosaic (W:H)
//! crop = false              # true = crop to fit, false = pad with black
//! cell_height = 300         # Pixel height of every grid cell
//!
//! [output]
//! quality = 95              # JPEG quality (1-100)
//! prefix = "processed_"     # File-name prefix for individually boxed images
//!
//! [input]
//! recursive = false         # Descend into sub-directories of directory inputs
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{BASE_CELL_HEIGHT, FitMode, MosaicParams, Quality};
use crate::ratio::{AspectRatio, parse_ratio};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "boxer.toml";

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

/// Configuration loaded from `boxer.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoxerConfig {
    /// Mosaic geometry (ratio, fit mode, cell height).
    pub mosaic: MosaicConfig,
    /// Encoding and naming of written files.
    pub output: OutputConfig,
    /// How input paths are expanded.
    pub input: InputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl BoxerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_ratio(&self.mosaic.aspect_ratio).map_err(|e| {
            ConfigError::Validation(format!("mosaic.aspect_ratio: {e}"))
        })?;
        if self.mosaic.cell_height == 0 {
            return Err(ConfigError::Validation(
                "mosaic.cell_height must be greater than 0".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.output.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "output.prefix must not be empty".into(),
            ));
        }
        if self.output.prefix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.prefix must not contain path separators".into(),
            ));
        }
        Ok(())
    }

    /// The configured target ratio.
    pub fn target_ratio(&self) -> Result<AspectRatio, ConfigError> {
        parse_ratio(&self.mosaic.aspect_ratio)
            .map_err(|e| ConfigError::Validation(format!("mosaic.aspect_ratio: {e}")))
    }

    pub fn fit(&self) -> FitMode {
        FitMode::from_crop_flag(self.mosaic.crop)
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }

    /// Mosaic parameters as configured, before any command-line override.
    pub fn mosaic_params(&self) -> Result<MosaicParams, ConfigError> {
        Ok(MosaicParams::new(self.target_ratio()?, self.fit())
            .with_cell_height(self.mosaic.cell_height))
    }
}

/// Mosaic geometry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MosaicConfig {
    /// Target ratio as `"W:H"`, e.g. `"16:9"`.
    pub aspect_ratio: String,
    /// Crop images that don't match their cell instead of padding them.
    pub crop: bool,
    /// Pixel height of each grid cell.
    pub cell_height: u32,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            crop: false,
            cell_height: BASE_CELL_HEIGHT,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG encoding quality (1 = worst, 100 = best). Lossless formats ignore it.
    pub quality: u32,
    /// Prefix for individually boxed files: `<prefix><original name>`.
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
            prefix: "processed_".to_string(),
        }
    }
}

/// Input expansion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Descend into sub-directories when a directory is given as input.
    pub recursive: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
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
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BoxerConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BoxerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BoxerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `boxer.toml` from the given directory, falling back to defaults when
/// there is none.
pub fn load_config(dir: &Path) -> Result<BoxerConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    resolve_config(stock_defaults_value()?, overlay)
}

/// Load an explicitly named config file. Unlike [`load_config`], a missing
/// file is an error.
pub fn load_config_file(path: &Path) -> Result<BoxerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Returns a fully-commented stock `boxer.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Boxer Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as `boxer.toml` in the directory you run from, or pass
# `--config <FILE>`. Command-line flags override these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Mosaic geometry
# ---------------------------------------------------------------------------
[mosaic]
# Target aspect ratio of the whole mosaic, as "W:H".
# Common choices: "16:9", "4:3", "1:1", "2:1", "3:2".
aspect_ratio = "16:9"

# How images that don't match their cell are fitted.
# false = pad with black borders (nothing lost), true = crop the centre.
crop = false

# Pixel height of each grid cell. Cell width follows from the ratio.
cell_height = 300

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG encoding quality (1 = worst, 100 = best). PNG and other lossless
# formats ignore it.
quality = 95

# Prefix for individually boxed files: processed_photo.jpg
prefix = "processed_"

# ---------------------------------------------------------------------------
# Input
# ---------------------------------------------------------------------------
[input]
# Descend into sub-directories when a directory is given as input.
recursive = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = BoxerConfig::default();
        assert_eq!(config.mosaic.aspect_ratio, "16:9");
        assert!(!config.mosaic.crop);
        assert_eq!(config.mosaic.cell_height, 300);
        assert_eq!(config.output.quality, 95);
        assert_eq!(config.output.prefix, "processed_");
        assert!(!config.input.recursive);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn default_mosaic_params() {
        let params = BoxerConfig::default().mosaic_params().unwrap();
        assert_eq!(params.target_ratio.value(), 16.0 / 9.0);
        assert_eq!(params.fit, FitMode::Pad);
        assert_eq!(params.cell_height, BASE_CELL_HEIGHT);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[mosaic]
crop = true
"#;
        let config: BoxerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.fit(), FitMode::Crop);
        // Defaults preserved
        assert_eq!(config.mosaic.aspect_ratio, "16:9");
        assert_eq!(config.output.quality, 95);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.mosaic.aspect_ratio, "16:9");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[mosaic]
aspect_ratio = "4:3"
cell_height = 200

[output]
prefix = "boxed-"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.mosaic.aspect_ratio, "4:3");
        assert_eq!(config.mosaic.cell_height, 200);
        assert_eq!(config.output.prefix, "boxed-");
        assert_eq!(config.output.quality, 95);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_file_requires_existing_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_file_any_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[input]\nrecursive = true\n").unwrap();
        let config = load_config_file(&path).unwrap();
        assert!(config.input.recursive);
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let threads = effective_threads(&ProcessingConfig { max_processes: None });
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let threads = effective_threads(&ProcessingConfig {
            max_processes: Some(99999),
        });
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[mosaic]
aspect_ratio = "16:9"
cell_height = 300
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[mosaic]
cell_height = 120
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let mosaic = merged.get("mosaic").unwrap();
        assert_eq!(mosaic.get("cell_height").unwrap().as_integer(), Some(120));
        assert_eq!(mosaic.get("aspect_ratio").unwrap().as_str(), Some("16:9"));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[mosaic]
aspect = "4:3"
"#;
        let err = toml::from_str::<BoxerConfig>(toml_str).unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<BoxerConfig, _> = toml::from_str("[mozaic]\ncrop = true\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(BoxerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_bad_ratio() {
        let mut config = BoxerConfig::default();
        config.mosaic.aspect_ratio = "16x9".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("W:H"), "{err}");
    }

    #[test]
    fn validate_zero_cell_height() {
        let mut config = BoxerConfig::default();
        config.mosaic.cell_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = BoxerConfig::default();
        config.output.quality = 1;
        assert!(config.validate().is_ok());
        config.output.quality = 100;
        assert!(config.validate().is_ok());
        config.output.quality = 0;
        assert!(config.validate().is_err());
        config.output.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_prefix() {
        let mut config = BoxerConfig::default();
        config.output.prefix = String::new();
        assert!(config.validate().is_err());
        config.output.prefix = "out/".to_string();
        assert!(config.validate().is_err());
        config.output.prefix = "boxed_".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[output]\nquality = 200\n").unwrap();
        let result = resolve_config(stock_defaults_value().unwrap(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: BoxerConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = BoxerConfig::default();
        assert_eq!(config.mosaic.aspect_ratio, defaults.mosaic.aspect_ratio);
        assert_eq!(config.mosaic.crop, defaults.mosaic.crop);
        assert_eq!(config.mosaic.cell_height, defaults.mosaic.cell_height);
        assert_eq!(config.output.quality, defaults.output.quality);
        assert_eq!(config.output.prefix, defaults.output.prefix);
        assert_eq!(config.input.recursive, defaults.input.recursive);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[mosaic]", "[output]", "[input]", "[processing]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        for key in ["mosaic", "output", "input", "processing"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
