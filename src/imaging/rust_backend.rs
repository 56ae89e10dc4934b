//! Pure Rust image I/O backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | EXIF tags + orientation | `kamadak-exif` via [`exif_reader`](super::exif_reader) |
//! | Logo decode | `image` → `RgbaImage` (alpha preserved) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → PNG / TIFF / WebP | `image::RgbImage::write_to` |
//! | Atomic write | `tempfile::NamedTempFile` in the target directory, then `persist` |

use super::backend::{BackendError, ImageBackend, LoadedImage};
use super::exif_reader::{orientation_from_tags, read_from_container};
use super::params::Quality;
use crate::metadata::RawTagMap;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions with a decoder compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` and `kamadak-exif` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// EXIF tags of a file. A file without (readable) EXIF yields an empty map.
fn read_tags_from_file(path: &Path) -> Result<RawTagMap, BackendError> {
    let mut reader = BufReader::new(File::open(path)?);
    match read_from_container(&mut reader) {
        Ok(tags) => Ok(tags),
        Err(e) => {
            log::debug!("no usable EXIF in {}: {e}", path.display());
            Ok(RawTagMap::new())
        }
    }
}

fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    PHOTO_CANDIDATES
        .iter()
        .find(|(candidate, fmt)| *candidate == ext && fmt.writing_enabled())
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| BackendError::UnsupportedFormat(path.to_path_buf()))
}

fn encode<W: Write + Seek>(
    image: &RgbImage,
    format: ImageFormat,
    quality: Quality,
    writer: &mut W,
    path: &Path,
) -> Result<(), BackendError> {
    let encode_error = |e: image::ImageError| BackendError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    match format {
        ImageFormat::Jpeg => JpegEncoder::new_with_quality(writer, quality.value() as u8)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(encode_error),
        other => image.write_to(writer, other).map_err(encode_error),
    }
}

/// Encode into a temp file beside `path`, then rename over it. A failed
/// encode drops the temp file, so `path` is never left half-written.
fn save_image(image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = output_format(path)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".exif-frame-")
        .suffix(".part")
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode(image, format, quality, &mut writer, path)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<LoadedImage, BackendError> {
        let pixels = load_image(path)?;
        let tags = read_tags_from_file(path)?;
        let orientation = orientation_from_tags(&tags);
        Ok(LoadedImage {
            pixels,
            orientation,
            tags,
        })
    }

    fn read_tags(&self, path: &Path) -> Result<RawTagMap, BackendError> {
        read_tags_from_file(path)
    }

    fn load_logo(&self, path: &Path) -> Result<RgbaImage, BackendError> {
        Ok(load_image(path)?.to_rgba8())
    }

    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        save_image(image, path, quality)
    }
}
