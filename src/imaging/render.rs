//! Template rendering.
//!
//! [`render`] is a pure function: it takes upright pixels, normalized
//! metadata, a [`WatermarkRequest`] and an optional decoded logo, and
//! returns the framed image. All geometry comes from
//! [`compute_layout`](super::calculations::compute_layout); this module
//! only decides where text and the logo go inside the band.
//!
//! ```text
//! bottom_only / full_frame        classic
//! ┌──────────────────────┐        ┌──────────────────────────────┐
//! │        image         │        │            image             │
//! ├──────────────────────┤        ├──────────────────────────────┤
//! │        [logo]        │        │ params   [logo] | Brand Model │
//! │   Shot on **Model**  │        │ time            |        lens │
//! │ 35.0mm f/2 1/60s ISO │        └──────────────────────────────┘
//! └──────────────────────┘
//! ```

use super::calculations::{Layout, LayoutError, compute_layout, scale_to_height};
use super::params::{CanvasConfig, WatermarkRequest};
use super::text::{FontSet, Run, draw_runs, runs_width, text_width};
use crate::metadata::{PhotoParameters, is_unknown};
use crate::types::TemplateStyle;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};
use std::fmt;
use std::path::PathBuf;

/// A degraded-but-successful render. Returned to the caller, who decides
/// whether to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWarning {
    LogoUnavailable { path: PathBuf, reason: String },
    FontFallback { path: PathBuf, reason: String },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderWarning::LogoUnavailable { path, reason } => {
                write!(f, "logo {} unavailable ({reason}); rendered without it", path.display())
            }
            RenderWarning::FontFallback { path, reason } => {
                write!(f, "font {} unusable ({reason}); used embedded font", path.display())
            }
        }
    }
}

/// Render a framed copy of `source`.
///
/// `source` must already be upright. Its pixels are copied onto the canvas
/// unmodified; everything else is drawn around them.
pub fn render(
    source: &DynamicImage,
    photo: &PhotoParameters,
    request: &WatermarkRequest,
    logo: Option<&RgbaImage>,
    fonts: &FontSet,
) -> Result<RgbImage, LayoutError> {
    let layout = compute_layout(
        source.width(),
        source.height(),
        request.style,
        &request.ratios,
        &request.canvas,
    )?;

    let mut canvas = RgbaImage::from_pixel(
        layout.final_width,
        layout.final_height,
        request.canvas.background.rgba(),
    );
    let (image_x, image_y) = layout.image_position();
    imageops::replace(&mut canvas, &source.to_rgba8(), image_x as i64, image_y as i64);

    let mut band = Band {
        canvas: &mut canvas,
        layout: &layout,
        fonts,
        color: request.text_color.rgba(),
    };
    match request.style {
        TemplateStyle::BottomOnly | TemplateStyle::FullFrame => band.draw_centered(photo, logo),
        TemplateStyle::Classic => band.draw_classic(photo, logo, &request.canvas),
    }

    Ok(DynamicImage::ImageRgba8(canvas).into_rgb8())
}

/// Drawing context for the band below the image.
struct Band<'a> {
    canvas: &'a mut RgbaImage,
    layout: &'a Layout,
    fonts: &'a FontSet,
    color: Rgba<u8>,
}

impl Band<'_> {
    fn size(&self) -> f32 {
        self.layout.font_size as f32
    }

    fn line_gap(&self) -> i64 {
        (self.layout.font_size / 4) as i64
    }

    /// Logo on top, then two centred lines.
    fn draw_centered(&mut self, photo: &PhotoParameters, logo: Option<&RgbaImage>) {
        let layout = *self.layout;
        let band_y = layout.band_y() as i64;
        let padding = layout.padding as i64;
        let center_x = layout.content_center_x() as i64;

        let mut text_top = band_y + 2 * padding;
        if let Some(logo) = logo.and_then(|l| scale_logo(l, layout.logo_height)) {
            let logo_y = band_y + padding / 2;
            let logo_x = center_x - logo.width() as i64 / 2;
            imageops::overlay(&mut *self.canvas, &logo, logo_x, logo_y);
            text_top = logo_y + logo.height() as i64 + padding / 2;
        }

        if layout.font_size == 0 {
            return;
        }
        let size = self.size();
        let line1 = [
            Run::new(self.fonts.regular(), "Shot on "),
            Run::new(self.fonts.bold(), &photo.camera_model),
        ];
        let width1 = runs_width(&line1, size) as i64;
        draw_runs(self.canvas, &line1, size, center_x - width1 / 2, text_top, self.color);

        let exposure = photo.exposure_line();
        let line2 = [Run::new(self.fonts.regular(), &exposure)];
        let width2 = runs_width(&line2, size) as i64;
        let line2_top = text_top + layout.font_size as i64 + self.line_gap();
        draw_runs(self.canvas, &line2, size, center_x - width2 / 2, line2_top, self.color);
    }

    /// Two columns split by a rule, logo left of the rule.
    fn draw_classic(
        &mut self,
        photo: &PhotoParameters,
        logo: Option<&RgbaImage>,
        canvas: &CanvasConfig,
    ) {
        let layout = *self.layout;
        if layout.font_size == 0 {
            return;
        }
        let size = self.size();
        let padding = layout.padding as i64;
        let band_y = layout.band_y() as i64;
        let band_h = layout.bottom_band_height as i64;
        let regular = self.fonts.regular();
        let bold = self.fonts.bold();

        // Left column: exposure, then capture time when known.
        let exposure = photo.exposure_line();
        let mut left: Vec<Run<'_>> = vec![Run::new(regular, &exposure)];
        if !is_unknown(&photo.capture_time) {
            left.push(Run::new(regular, &photo.capture_time));
        }

        // Right column: camera in bold, then lens or author.
        let camera = photo.camera_line();
        let detail = if is_unknown(&photo.lens_model) {
            &photo.author
        } else {
            &photo.lens_model
        };
        let right = [Run::new(bold, &camera), Run::new(regular, detail)];

        let left_x = layout.content_left() as i64 + padding;
        let left_top = band_y + (band_h - self.block_height(left.len())) / 2;
        let mut left_right_edge = left_x;
        for (i, run) in left.iter().enumerate() {
            let y = left_top + i as i64 * (layout.font_size as i64 + self.line_gap());
            draw_runs(self.canvas, std::slice::from_ref(run), size, left_x, y, self.color);
            left_right_edge = left_right_edge.max(left_x + text_width(run.font, size, run.text) as i64);
        }

        let right_edge = layout.content_right() as i64 - padding;
        let right_top = band_y + (band_h - self.block_height(right.len())) / 2;
        let mut right_column_left = right_edge;
        for (i, run) in right.iter().enumerate() {
            let width = text_width(run.font, size, run.text) as i64;
            let y = right_top + i as i64 * (layout.font_size as i64 + self.line_gap());
            draw_runs(self.canvas, std::slice::from_ref(run), size, right_edge - width, y, self.color);
            right_column_left = right_column_left.min(right_edge - width);
        }

        let separator_x = right_column_left - padding;
        if separator_x > left_right_edge {
            let thickness = (layout.font_size as i64 / 20).max(1);
            fill_rect(
                self.canvas,
                separator_x,
                band_y + padding,
                thickness,
                band_h - 2 * padding,
                canvas.separator_color.rgba(),
            );
        }

        let Some(logo) = logo else {
            return;
        };
        let logo_right = separator_x - padding;
        let available = logo_right - (left_right_edge + padding);
        if available <= 0 {
            log::debug!("classic band has no room for the logo; omitted");
            return;
        }
        let target_height = (layout.bottom_band_height as f64 / canvas.classic_logo_divisor).floor() as u32;
        let Some(scaled) = scale_logo_within(logo, target_height, available as u32) else {
            return;
        };
        let logo_x = logo_right - scaled.width() as i64;
        let logo_y = band_y + (band_h - scaled.height() as i64) / 2;
        imageops::overlay(&mut *self.canvas, &scaled, logo_x, logo_y);
    }

    fn block_height(&self, lines: usize) -> i64 {
        let n = lines as i64;
        n * self.layout.font_size as i64 + (n - 1).max(0) * self.line_gap()
    }
}

/// Resize a logo to `height`, preserving aspect ratio.
fn scale_logo(logo: &RgbaImage, height: u32) -> Option<RgbaImage> {
    scale_logo_within(logo, height, u32::MAX)
}

/// Resize a logo to `height`, shrinking further if it would exceed `max_width`.
fn scale_logo_within(logo: &RgbaImage, height: u32, max_width: u32) -> Option<RgbaImage> {
    if logo.width() == 0 || logo.height() == 0 || height == 0 {
        return None;
    }
    let (mut w, mut h) = scale_to_height(logo.dimensions(), height);
    if w > max_width {
        h = (h as f64 * max_width as f64 / w as f64).floor() as u32;
        w = max_width;
    }
    if w == 0 || h == 0 {
        return None;
    }
    Some(imageops::resize(logo, w, h, FilterType::Lanczos3))
}

fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(canvas.width() as i64);
    let y1 = (y + h).min(canvas.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}
