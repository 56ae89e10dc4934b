//! Shared test utilities for the exif-frame test suite.
//!
//! Synthetic images, tag maps and EXIF-bearing JPEGs, so no test depends on
//! fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("shot.jpg");
//! write_jpeg_with_exif(&path, 300, 200, &canon_fields());
//!
//! let photo = extract_parameters(&tag_map(vec![("Make", text("Canon"))]));
//! ```

use crate::metadata::{PhotoParameters, RawTagMap, TagValue};
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Tag maps and parameters
// =========================================================================

pub fn tag_map(entries: Vec<(&str, TagValue)>) -> RawTagMap {
    entries.into_iter().collect()
}

pub fn text(s: &str) -> TagValue {
    TagValue::Text(s.to_string())
}

/// A fully populated parameter record.
pub fn sample_photo() -> PhotoParameters {
    PhotoParameters {
        brand: "FUJIFILM".into(),
        camera_model: "X-T5".into(),
        lens_model: "XF23mmF1.4 R".into(),
        aperture: "f/2.8".into(),
        shutter_speed: "1/125s".into(),
        iso: "ISO200".into(),
        focal_length: "23.0mm".into(),
        equivalent_focal_length: "34.5mm".into(),
        capture_time: "2024-05-01 13:45:00".into(),
        author: "@robbb".into(),
    }
}

// =========================================================================
// Synthetic pixels
// =========================================================================

/// Deterministic RGB gradient; no two neighbouring pixels share a value.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8])
    }))
}

pub fn solid_logo(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

// =========================================================================
// JPEG files
// =========================================================================

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Create a JPEG with an APP1 EXIF segment holding `fields`.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, fields: &[Field]) {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let jpeg = jpeg_bytes(width, height);
    let payload_len = 2 + 6 + tiff.len();
    let mut out = Vec::with_capacity(jpeg.len() + payload_len + 2);
    out.extend_from_slice(&jpeg[..2]); // SOI
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&(payload_len as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

fn primary(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

/// Typical tags from a Canon body.
pub fn canon_fields() -> Vec<Field> {
    vec![
        primary(Tag::Make, Value::Ascii(vec![b"Canon".to_vec()])),
        primary(Tag::Model, Value::Ascii(vec![b"Canon EOS R7".to_vec()])),
        primary(Tag::FNumber, Value::Rational(vec![Rational { num: 28, denom: 10 }])),
        primary(Tag::ExposureTime, Value::Rational(vec![Rational { num: 1, denom: 125 }])),
        primary(Tag::PhotographicSensitivity, Value::Short(vec![200])),
        primary(Tag::FocalLength, Value::Rational(vec![Rational { num: 35, denom: 1 }])),
        primary(
            Tag::DateTimeOriginal,
            Value::Ascii(vec![b"2024:05:01 13:45:00".to_vec()]),
        ),
    ]
}
