//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the boundary between the pure rendering
//! core and the filesystem: decode a photo with its EXIF tags, decode a
//! logo, read tags alone, and encode the result.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on `image` and
//! `kamadak-exif`. Tests use the [`MockBackend`](tests::MockBackend) below.

use super::orientation::{Orientation, SourceImage};
use super::params::Quality;
use crate::metadata::RawTagMap;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// A decoded photo: pixels in stored order, the pending orientation, and
/// every EXIF tag that could be read.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixels: DynamicImage,
    pub orientation: Orientation,
    pub tags: RawTagMap,
}

impl LoadedImage {
    pub fn into_parts(self) -> (SourceImage, RawTagMap) {
        (SourceImage::new(self.pixels, self.orientation), self.tags)
    }
}

/// Trait for image I/O backends.
pub trait ImageBackend: Sync {
    /// Decode a photo and its EXIF tags. Missing or corrupt EXIF is not an
    /// error: the tag map is empty and the orientation `Normal`.
    fn load(&self, path: &Path) -> Result<LoadedImage, BackendError>;

    /// Read EXIF tags without decoding pixels.
    fn read_tags(&self, path: &Path) -> Result<RawTagMap, BackendError>;

    /// Decode a logo with its alpha channel.
    fn load_logo(&self, path: &Path) -> Result<RgbaImage, BackendError>;

    /// Encode `image` to `path`. The format follows the extension. The file
    /// either appears complete or not at all.
    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError>;
}
