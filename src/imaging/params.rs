//! Parameter types for frame rendering.
//!
//! These structs describe *what* frame to draw, not *how* to draw it. They
//! are the interface between the configuration layer (which assembles them
//! from TOML and CLI flags), the pure [`calculations`](super::calculations)
//! and [`render`](super::render) modules, and the
//! [`operations`](super::operations) that tie a render to backend I/O.
//!
//! ## Types
//!
//! - [`RatioConfig`]: the five divisors that scale every frame element to the image.
//! - [`CanvasConfig`]: background, separator colour, portrait target aspect, classic logo size.
//! - [`Quality`]: lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`WatermarkRequest`]: style + colours + ratios for a single render.
//! - [`FrameJob`]: a full file-to-file job: source, output, logo, request, quality.

use super::calculations::LayoutError;
use crate::config::MetadataConfig;
use crate::types::{Color, TemplateStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Divisors applied to image dimensions. Larger values give thinner
/// elements: `border = min(w, h) / border`, `band = h / bottom`, and
/// font size, logo height and padding are fractions of the band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatioConfig {
    #[serde(rename = "border")]
    pub border_ratio: f64,
    #[serde(rename = "bottom")]
    pub bottom_ratio: f64,
    #[serde(rename = "font")]
    pub font_ratio: f64,
    #[serde(rename = "logo")]
    pub logo_ratio: f64,
    #[serde(rename = "padding")]
    pub padding_ratio: f64,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            border_ratio: 35.0,
            bottom_ratio: 8.0,
            font_ratio: 5.0,
            logo_ratio: 3.5,
            padding_ratio: 6.0,
        }
    }
}

impl RatioConfig {
    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("border", self.border_ratio),
            ("bottom", self.bottom_ratio),
            ("font", self.font_ratio),
            ("logo", self.logo_ratio),
            ("padding", self.padding_ratio),
        ]
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        for (name, value) in self.named() {
            check_divisor(name, value)?;
        }
        Ok(())
    }
}

/// Canvas-wide constants that aren't derived from the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub background: Color,
    #[serde(rename = "separator")]
    pub separator_color: Color,
    /// Target `[width, height]` for portrait canvases, e.g. `[4, 5]`.
    pub portrait_aspect: [u32; 2],
    /// Classic-style logo height is `band / classic_logo_divisor`.
    pub classic_logo_divisor: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            separator_color: Color([200, 200, 200]),
            portrait_aspect: [4, 5],
            classic_logo_divisor: 1.5,
        }
    }
}

impl CanvasConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let [w, h] = self.portrait_aspect;
        if w == 0 || h == 0 {
            return Err(LayoutError::InvalidAspect(w, h));
        }
        check_divisor("classic_logo_divisor", self.classic_logo_divisor)
    }

    /// Portrait target as width / height.
    pub fn portrait_target(&self) -> f64 {
        let [w, h] = self.portrait_aspect;
        w as f64 / h as f64
    }
}

fn check_divisor(name: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidRatio { name, value })
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Style and geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WatermarkRequest {
    pub style: TemplateStyle,
    pub text_color: Color,
    pub ratios: RatioConfig,
    pub canvas: CanvasConfig,
}

/// Where a job's logo comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogoSource {
    #[default]
    None,
    /// A specific PNG.
    File(PathBuf),
    /// A directory of brand logos; the one matching the photo's `Make` is used.
    Directory(PathBuf),
}

/// A complete file-to-file frame job.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameJob {
    pub source: PathBuf,
    pub output: PathBuf,
    pub logo: LogoSource,
    pub request: WatermarkRequest,
    pub metadata: MetadataConfig,
    pub quality: Quality,
}
