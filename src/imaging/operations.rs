//! High-level frame operations.
//!
//! These functions combine the pure core (metadata normalization,
//! orientation, layout, rendering) with backend I/O. The core never touches
//! the filesystem; everything here that does goes through [`ImageBackend`].

use super::backend::{BackendError, ImageBackend};
use super::calculations::{LayoutError, fit_within};
use super::orientation::{Orientation, SourceImage, normalize_orientation};
use super::params::{FrameJob, LogoSource, WatermarkRequest};
use super::render::{RenderWarning, render};
use super::text::{FontError, FontSet};
use crate::config::MetadataConfig;
use crate::logos::logo_for_brand;
use crate::metadata::{NormalizeReport, PhotoParameters, normalize_report};
use crate::types::TemplateStyle;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("cannot read source image: {0}")]
    Source(#[source] BackendError),
    #[error("cannot write output: {0}")]
    Save(#[source] BackendError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Font(#[from] FontError),
}

/// Outcome of a successful frame job.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub style: TemplateStyle,
    pub width: u32,
    pub height: u32,
    pub photo: PhotoParameters,
    pub warnings: Vec<RenderWarning>,
}

/// Orient and frame an in-memory image. Pure: no I/O.
pub fn render_watermark(
    source: DynamicImage,
    orientation: Orientation,
    photo: &PhotoParameters,
    request: &WatermarkRequest,
    logo: Option<&RgbaImage>,
    fonts: &FontSet,
) -> Result<RgbImage, FrameError> {
    let upright = normalize_orientation(SourceImage::new(source, orientation));
    Ok(render(&upright.pixels, photo, request, logo, fonts)?)
}

/// Load, frame, and save one image.
pub fn frame_file(
    backend: &impl ImageBackend,
    job: &FrameJob,
    fonts: &FontSet,
) -> Result<FrameReport, FrameError> {
    let rendered = render_job(backend, job, fonts)?;
    backend
        .save(&rendered.image, &job.output, job.quality)
        .map_err(FrameError::Save)?;
    Ok(rendered.into_report(job, &job.output))
}

/// Frame one image and save a copy downscaled to fit `max` to `output`.
pub fn preview_file(
    backend: &impl ImageBackend,
    job: &FrameJob,
    fonts: &FontSet,
    max: (u32, u32),
    output: &Path,
) -> Result<FrameReport, FrameError> {
    let mut rendered = render_job(backend, job, fonts)?;
    rendered.image = preview_image(&rendered.image, max.0, max.1);
    backend
        .save(&rendered.image, output, job.quality)
        .map_err(FrameError::Save)?;
    Ok(rendered.into_report(job, output))
}

/// Downscale to fit within `max_width × max_height`, preserving aspect
/// ratio. Images that already fit are returned unchanged.
pub fn preview_image(image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    let (w, h) = fit_within(image.dimensions(), (max_width, max_height));
    if (w, h) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, w, h, FilterType::Lanczos3)
}

/// Read and normalize a file's metadata without decoding its pixels.
pub fn describe_file(
    backend: &impl ImageBackend,
    path: &Path,
    metadata: &MetadataConfig,
) -> Result<NormalizeReport, BackendError> {
    let tags = backend.read_tags(path)?;
    Ok(normalize_report(&tags, metadata))
}

struct Rendered {
    image: RgbImage,
    photo: PhotoParameters,
    warnings: Vec<RenderWarning>,
}

impl Rendered {
    fn into_report(self, job: &FrameJob, output: &Path) -> FrameReport {
        FrameReport {
            source: job.source.clone(),
            output: output.to_path_buf(),
            style: job.request.style,
            width: self.image.width(),
            height: self.image.height(),
            photo: self.photo,
            warnings: self.warnings,
        }
    }
}

fn render_job(
    backend: &impl ImageBackend,
    job: &FrameJob,
    fonts: &FontSet,
) -> Result<Rendered, FrameError> {
    let loaded = backend.load(&job.source).map_err(FrameError::Source)?;
    let (source, tags) = loaded.into_parts();
    let report = normalize_report(&tags, &job.metadata);
    for issue in &report.issues {
        log::debug!("{}: {} ({})", job.source.display(), issue.field, issue.error);
    }
    let photo = report.params;

    let mut warnings = Vec::new();
    let logo = resolve_logo(backend, &job.logo, &photo.brand, &mut warnings);

    let image = render_watermark(
        source.pixels,
        source.orientation,
        &photo,
        &job.request,
        logo.as_ref(),
        fonts,
    )?;
    Ok(Rendered {
        image,
        photo,
        warnings,
    })
}

/// Decode the job's logo. A logo that can't be found or read degrades to
/// a warning; the frame is rendered without it.
fn resolve_logo(
    backend: &impl ImageBackend,
    source: &LogoSource,
    brand: &str,
    warnings: &mut Vec<RenderWarning>,
) -> Option<RgbaImage> {
    let path = match source {
        LogoSource::None => return None,
        LogoSource::File(path) => path.clone(),
        LogoSource::Directory(dir) => match logo_for_brand(dir, brand) {
            Some(path) => path,
            None => {
                log::debug!("no logo in {} matches brand '{brand}'", dir.display());
                return None;
            }
        },
    };
    match backend.load_logo(&path) {
        Ok(logo) => Some(logo),
        Err(e) => {
            log::warn!("logo {} unavailable: {e}", path.display());
            warnings.push(RenderWarning::LogoUnavailable {
                path,
                reason: e.to_string(),
            });
            None
        }
    }
}
