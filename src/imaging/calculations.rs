//! Pure geometry for frames.
//!
//! All functions here are pure and testable without any I/O or images.
//! Every size is derived from the source dimensions through the divisors in
//! [`RatioConfig`], so a frame looks the same on a 1 MP and a 60 MP file.

use super::params::{CanvasConfig, RatioConfig};
use crate::types::TemplateStyle;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("image dimensions must be non-zero (got {width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("{name} ratio must be a positive finite number (got {value})")]
    InvalidRatio { name: &'static str, value: f64 },
    #[error("portrait aspect must have non-zero components (got {0}:{1})")]
    InvalidAspect(u32, u32),
    #[error("framed canvas would exceed {max} px on a side", max = u32::MAX)]
    TooLarge,
}

/// Every dimension and position a render needs.
///
/// The *content* canvas is the image plus its border and band. The *final*
/// canvas may be wider or taller than the content when a portrait image is
/// padded out to the target aspect; `offset_x`/`offset_y` place the content
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub border_width: u32,
    pub bottom_band_height: u32,
    pub font_size: u32,
    pub padding: u32,
    pub logo_height: u32,
    pub content_width: u32,
    pub content_height: u32,
    pub final_width: u32,
    pub final_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    /// Image origin inside the content canvas.
    pub image_x: u32,
    pub image_y: u32,
    /// Band top edge inside the content canvas.
    pub band_top: u32,
}

impl Layout {
    /// Where the source image lands on the final canvas.
    pub fn image_position(&self) -> (u32, u32) {
        (self.offset_x + self.image_x, self.offset_y + self.image_y)
    }

    /// Band top edge on the final canvas.
    pub fn band_y(&self) -> u32 {
        self.offset_y + self.band_top
    }

    pub fn content_left(&self) -> u32 {
        self.offset_x
    }

    pub fn content_right(&self) -> u32 {
        self.offset_x + self.content_width
    }

    pub fn content_center_x(&self) -> u32 {
        self.offset_x + self.content_width / 2
    }

    /// Whether the canvas was widened or heightened past the content.
    pub fn is_padded(&self) -> bool {
        self.offset_x > 0
            || self.offset_y > 0
            || self.final_width != self.content_width
            || self.final_height != self.content_height
    }
}

/// Compute the frame layout for a `width × height` image.
///
/// # Examples
/// ```
/// # use exif_frame::imaging::{compute_layout, CanvasConfig, RatioConfig};
/// # use exif_frame::types::TemplateStyle;
/// let layout = compute_layout(
///     3000,
///     2000,
///     TemplateStyle::BottomOnly,
///     &RatioConfig::default(),
///     &CanvasConfig::default(),
/// )
/// .unwrap();
/// assert_eq!((layout.final_width, layout.final_height), (3000, 2250));
/// ```
pub fn compute_layout(
    width: u32,
    height: u32,
    style: TemplateStyle,
    ratios: &RatioConfig,
    canvas: &CanvasConfig,
) -> Result<Layout, LayoutError> {
    if width == 0 || height == 0 {
        return Err(LayoutError::EmptyImage { width, height });
    }
    ratios.validate()?;
    canvas.validate()?;

    let border = if style.has_border() {
        scale_down(width.min(height), ratios.border_ratio)
    } else {
        0
    };
    let band = scale_down(height, ratios.bottom_ratio);

    let content_width = checked_side(width as u64 + 2 * border as u64)?;
    let content_height = checked_side(height as u64 + border as u64 + band as u64)?;

    let (final_width, final_height, offset_x, offset_y) = if height > width {
        fit_portrait(content_width, content_height, canvas.portrait_target())?
    } else {
        (content_width, content_height, 0, 0)
    };

    Ok(Layout {
        border_width: border,
        bottom_band_height: band,
        font_size: scale_down(band, ratios.font_ratio),
        padding: scale_down(band, ratios.padding_ratio),
        logo_height: scale_down(band, ratios.logo_ratio),
        content_width,
        content_height,
        final_width,
        final_height,
        offset_x,
        offset_y,
        image_x: border,
        image_y: border,
        band_top: height + border,
    })
}

fn scale_down(value: u32, divisor: f64) -> u32 {
    (value as f64 / divisor).floor() as u32
}

fn checked_side(value: u64) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::TooLarge)
}

fn checked_round(value: f64) -> Result<u32, LayoutError> {
    let rounded = value.round();
    if rounded > u32::MAX as f64 {
        return Err(LayoutError::TooLarge);
    }
    Ok(rounded as u32)
}

/// Pad a content canvas out to `target` (width / height), centring it.
///
/// Returns `(final_width, final_height, offset_x, offset_y)`.
fn fit_portrait(
    content_width: u32,
    content_height: u32,
    target: f64,
) -> Result<(u32, u32, u32, u32), LayoutError> {
    let ratio = content_width as f64 / content_height as f64;
    if ratio < target {
        let final_width = checked_round(content_height as f64 * target)?.max(content_width);
        let offset_x = (final_width - content_width) / 2;
        Ok((final_width, content_height, offset_x, 0))
    } else if ratio > target {
        let final_height = checked_round(content_width as f64 / target)?.max(content_height);
        let offset_y = (final_height - content_height) / 2;
        Ok((content_width, final_height, 0, offset_y))
    } else {
        Ok((content_width, content_height, 0, 0))
    }
}

/// Dimensions that fit `(width, height)` inside `(max_width, max_height)`,
/// preserving aspect ratio. Never upscales.
pub fn fit_within(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (w, h) = source;
    let (max_w, max_h) = max;
    if w <= max_w && h <= max_h {
        return (w, h);
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let out_w = ((w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let out_h = ((h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (out_w, out_h)
}

/// Scale `(width, height)` to the given height, preserving aspect ratio.
pub fn scale_to_height(source: (u32, u32), target_height: u32) -> (u32, u32) {
    let (w, h) = source;
    if h == 0 {
        return (0, 0);
    }
    let out_w = (w as f64 * target_height as f64 / h as f64).round() as u32;
    (out_w, target_height)
}
