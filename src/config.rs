//! Frame configuration module.
//!
//! Handles loading, validating, and merging `exif-frame.toml`. Configuration
//! is layered: stock defaults are overridden by a config file, and the CLI
//! overrides both.
//!
//! ## Config File Location
//!
//! `--config PATH` names the file explicitly. Without it, `exif-frame.toml`
//! in the working directory is used when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! style = "bottom_only"       # full_frame | bottom_only | classic
//! text_color = "#000000"
//!
//! [ratios]                    # divisors; larger = thinner
//! border = 35.0               # border = min(w, h) / border   (full_frame)
//! bottom = 8.0                # band   = h / bottom
//! font = 5.0                  # font   = band / font
//! logo = 3.5                  # logo   = band / logo
//! padding = 6.0               # margin = band / padding
//!
//! [canvas]
//! background = "#ffffff"
//! separator = "#c8c8c8"       # classic column rule
//! portrait_aspect = [4, 5]    # portrait canvases are padded to this
//! classic_logo_divisor = 1.5  # classic logo = band / divisor
//!
//! [metadata]
//! default_author = "@robbb"
//! default_crop_factor = 1.5
//! crop_factors = { canon = 1.6 }
//!
//! [fonts]                     # TrueType overrides for the embedded faces
//! # regular = "/path/to/Regular.ttf"
//! # bold = "/path/to/Bold.ttf"
//!
//! [output]
//! quality = 95                # JPEG quality (1-100)
//! suffix = "_watermarked"     # appended to the file stem
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! style = "classic"
//! [canvas]
//! background = "#111111"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CanvasConfig, Quality, RatioConfig, WatermarkRequest};
use crate::types::{Color, TemplateStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "exif-frame.toml";

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

/// Configuration loaded from `exif-frame.toml`.
///
/// All fields have defaults; a config file only needs the values it
/// overrides. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Frame template.
    pub style: TemplateStyle,
    /// Colour of the band text.
    pub text_color: Color,
    /// Proportional sizes of frame elements.
    pub ratios: RatioConfig,
    /// Background, separator and portrait padding.
    pub canvas: CanvasConfig,
    /// EXIF normalization settings.
    pub metadata: MetadataConfig,
    /// Optional font overrides.
    pub fonts: FontsConfig,
    /// Encoding and naming of written files.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl FrameConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ratios
            .validate()
            .map_err(|e| ConfigError::Validation(format!("ratios: {e}")))?;
        self.canvas
            .validate()
            .map_err(|e| ConfigError::Validation(format!("canvas: {e}")))?;
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.output.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "output.suffix must not be empty".into(),
            ));
        }
        self.metadata.validate()
    }

    /// The render parameters this config describes.
    pub fn request(&self) -> WatermarkRequest {
        WatermarkRequest {
            style: self.style,
            text_color: self.text_color,
            ratios: self.ratios,
            canvas: self.canvas,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }
}

/// EXIF normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// Author shown when the image carries no `Artist` tag.
    pub default_author: String,
    /// Crop factor for brands not listed in `crop_factors`.
    pub default_crop_factor: f64,
    /// Per-brand crop factors. A key matches when it appears,
    /// case-insensitively, in the camera `Make`.
    pub crop_factors: BTreeMap<String, f64>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            default_author: crate::metadata::DEFAULT_AUTHOR.to_string(),
            default_crop_factor: 1.5,
            crop_factors: BTreeMap::from([("canon".to_string(), 1.6)]),
        }
    }
}

impl MetadataConfig {
    /// Crop factor for a camera brand.
    pub fn crop_factor_for(&self, brand: &str) -> f64 {
        let brand = brand.to_lowercase();
        self.crop_factors
            .iter()
            .find(|(key, _)| brand.contains(&key.to_lowercase()))
            .map(|(_, factor)| *factor)
            .unwrap_or(self.default_crop_factor)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.default_crop_factor) {
            return Err(ConfigError::Validation(
                "metadata.default_crop_factor must be positive".into(),
            ));
        }
        for (brand, factor) in &self.crop_factors {
            if brand.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "metadata.crop_factors keys must not be empty".into(),
                ));
            }
            if !positive(*factor) {
                return Err(ConfigError::Validation(format!(
                    "metadata.crop_factors.{brand} must be positive"
                )));
            }
        }
        Ok(())
    }
}

/// TrueType files replacing the embedded DejaVu faces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<PathBuf>,
}

/// Output encoding and naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Appended to the source file stem to name the output.
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            suffix: "_watermarked".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
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
    Ok(toml::Value::try_from(FrameConfig::default())?)
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
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// is not valid TOML.
pub fn load_raw_config(file: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !file.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(file)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FrameConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FrameConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An `explicit` path must exist. Otherwise `exif-frame.toml` in
/// `search_dir` is used when present, and stock defaults when not.
pub fn load_config(explicit: Option<&Path>, search_dir: &Path) -> Result<FrameConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(file) => Some(toml::from_str::<toml::Value>(&fs::read_to_string(file)?)?),
        None => load_raw_config(&search_dir.join(CONFIG_FILE_NAME))?,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `exif-frame.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# exif-frame configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from --config PATH, or from exif-frame.toml in the
# working directory. Command-line flags override anything set here.
# Unknown keys will cause an error.

# Frame template: full_frame, bottom_only or classic.
#   bottom_only  image edges untouched, text band below
#   full_frame   uniform border on three sides, text band below
#   classic      bottom band split into two columns by a vertical rule
style = "bottom_only"

# Colour of the band text, as #rrggbb.
text_color = "#000000"

# ---------------------------------------------------------------------------
# Proportions
# ---------------------------------------------------------------------------
# Every element is a fraction of the image. Larger divisors give thinner
# elements.
[ratios]
border = 35.0    # border = min(width, height) / border (full_frame only)
bottom = 8.0     # band height = height / bottom
font = 5.0       # font size = band / font
logo = 3.5       # logo height = band / logo
padding = 6.0    # horizontal margin = band / padding

# ---------------------------------------------------------------------------
# Canvas
# ---------------------------------------------------------------------------
[canvas]
background = "#ffffff"
# Vertical rule between the classic style's two columns.
separator = "#c8c8c8"
# Portrait canvases are widened to this [width, height] aspect.
portrait_aspect = [4, 5]
# Classic logo height = band / classic_logo_divisor.
classic_logo_divisor = 1.5

# ---------------------------------------------------------------------------
# EXIF normalization
# ---------------------------------------------------------------------------
[metadata]
# Shown when the image has no Artist tag.
default_author = "@robbb"
# Crop factor for the 35mm-equivalent focal length.
default_crop_factor = 1.5

# Per-brand crop factors. A key matches when it appears in the camera Make
# (case-insensitive).
[metadata.crop_factors]
canon = 1.6

# ---------------------------------------------------------------------------
# Fonts
# ---------------------------------------------------------------------------
# TrueType files replacing the embedded DejaVu Sans faces.
[fonts]
# regular = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
# bold = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG encoding quality (1 = worst, 100 = best).
quality = 95
# Appended to the source file stem: photo.jpg -> photo_watermarked.jpg
suffix = "_watermarked"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch runs.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
