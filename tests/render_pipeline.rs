//! End-to-end tests through the public API: synthetic JPEGs with real EXIF
//! segments are framed by the Rust backend and read back from disk.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use exif_frame::config::MetadataConfig;
use exif_frame::imaging::{
    FontSet, FrameError, FrameJob, LogoSource, Quality, RenderWarning, RustBackend,
    WatermarkRequest, compute_layout, describe_file, frame_file, render,
};
use exif_frame::metadata::{PhotoParameters, RawTagMap, TagValue, normalize};
use exif_frame::types::TemplateStyle;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn ascii(tag: Tag, s: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![s.as_bytes().to_vec()]),
    }
}

fn rational(tag: Tag, num: u32, denom: u32) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(vec![Rational { num, denom }]),
    }
}

fn canon_exif() -> Vec<Field> {
    vec![
        ascii(Tag::Make, "Canon"),
        ascii(Tag::Model, "Canon EOS R7"),
        rational(Tag::FNumber, 28, 10),
        rational(Tag::ExposureTime, 1, 125),
        Field {
            tag: Tag::PhotographicSensitivity,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![200]),
        },
        rational(Tag::FocalLength, 35, 1),
        ascii(Tag::DateTimeOriginal, "2024:05:01 13:45:00"),
    ]
}

fn pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 200) as u8 + 40, (y % 200) as u8 + 40, 160])
    })
}

/// A baseline JPEG with an APP1 segment right after SOI.
fn write_jpeg(path: &Path, width: u32, height: u32, fields: &[Field]) {
    let img = pattern(width, height);
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();

    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

fn job(source: PathBuf, output: PathBuf, style: TemplateStyle) -> FrameJob {
    FrameJob {
        source,
        output,
        logo: LogoSource::None,
        request: WatermarkRequest {
            style,
            ..WatermarkRequest::default()
        },
        metadata: MetadataConfig::default(),
        quality: Quality::new(90),
    }
}

fn fonts() -> FontSet {
    FontSet::embedded().unwrap()
}

fn canon_photo() -> PhotoParameters {
    let tags: RawTagMap = [
        ("Make", TagValue::Text("Canon".into())),
        ("Model", TagValue::Text("EOS R7".into())),
        ("FNumber", TagValue::Rational { num: 28, den: 10 }),
        ("ExposureTime", TagValue::Rational { num: 1, den: 125 }),
        ("ISOSpeedRatings", TagValue::Integer(200)),
        ("FocalLength", TagValue::Rational { num: 35, den: 1 }),
    ]
    .into_iter()
    .collect();
    normalize(&tags, &MetadataConfig::default())
}

// =========================================================================
// Render (in memory)
// =========================================================================

#[test]
fn bottom_only_keeps_source_pixels_and_adds_band() {
    let source = pattern(3000, 2000);
    let framed = render(
        &DynamicImage::ImageRgb8(source.clone()),
        &canon_photo(),
        &WatermarkRequest::default(),
        None,
        &fonts(),
    )
    .unwrap();

    assert_eq!(framed.dimensions(), (3000, 2250));
    assert_eq!(framed.get_pixel(0, 0), source.get_pixel(0, 0));
    for (x, y) in [(1, 1), (1500, 1000), (2999, 1999), (0, 1999)] {
        assert_eq!(framed.get_pixel(x, y), source.get_pixel(x, y), "pixel ({x}, {y})");
    }

    let text_pixels = (2000..2250)
        .flat_map(|y| (0..3000).map(move |x| (x, y)))
        .filter(|&(x, y)| framed.get_pixel(x, y).0.iter().all(|&c| c < 128))
        .count();
    assert!(text_pixels > 100, "expected text in the band, got {text_pixels} dark pixels");
}

fn is_ink(img: &RgbImage, x: u32, y: u32) -> bool {
    img.get_pixel(x, y).0.iter().all(|&c| c < 128)
}

/// Vertical runs of rows holding ink, as `(first_row, last_row)`.
fn ink_rows(img: &RgbImage, y0: u32, y1: u32) -> Vec<(u32, u32)> {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for y in y0..y1 {
        if !(0..img.width()).any(|x| is_ink(img, x, y)) {
            continue;
        }
        match runs.last_mut() {
            Some((_, last)) if *last + 1 == y => *last = y,
            _ => runs.push((y, y)),
        }
    }
    runs
}

/// Midpoint of the ink's horizontal extent between rows `y0..=y1`.
fn ink_center_x(img: &RgbImage, y0: u32, y1: u32) -> f64 {
    let xs: Vec<u32> = (y0..=y1)
        .flat_map(|y| (0..img.width()).filter(move |&x| is_ink(img, x, y)))
        .collect();
    let min = *xs.iter().min().unwrap();
    let max = *xs.iter().max().unwrap();
    (min + max) as f64 / 2.0
}

#[test]
fn bottom_only_band_holds_two_centred_lines() {
    let request = WatermarkRequest::default();
    let layout = compute_layout(
        3000,
        2000,
        request.style,
        &request.ratios,
        &request.canvas,
    )
    .unwrap();
    let framed = render(
        &DynamicImage::ImageRgb8(pattern(3000, 2000)),
        &canon_photo(),
        &request,
        None,
        &fonts(),
    )
    .unwrap();

    let band_top = layout.band_y();
    let rows = ink_rows(&framed, band_top, framed.height());
    assert_eq!(rows.len(), 2, "expected two separate text lines, got {rows:?}");
    assert!(rows[1].0 > rows[0].1 + 1, "lines must be separated by blank rows");

    let center = layout.content_center_x() as f64;
    for (y0, y1) in rows {
        let mid = ink_center_x(&framed, y0, y1);
        assert!(
            (mid - center).abs() <= 5.0,
            "line at rows {y0}..={y1} centred at {mid}, expected {center}"
        );
    }
}

#[test]
fn render_is_deterministic() {
    let source = DynamicImage::ImageRgb8(pattern(600, 900));
    let request = WatermarkRequest {
        style: TemplateStyle::Classic,
        ..WatermarkRequest::default()
    };
    let a = render(&source, &canon_photo(), &request, None, &fonts()).unwrap();
    let b = render(&source, &canon_photo(), &request, None, &fonts()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_source_is_rejected() {
    let result = render(
        &DynamicImage::new_rgb8(0, 10),
        &PhotoParameters::default(),
        &WatermarkRequest::default(),
        None,
        &fonts(),
    );
    assert!(result.is_err());
}

// =========================================================================
// Files
// =========================================================================

#[test]
fn exif_is_read_and_normalized_from_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("canon.jpg");
    write_jpeg(&path, 64, 48, &canon_exif());

    let report = describe_file(&RustBackend::new(), &path, &MetadataConfig::default()).unwrap();
    let p = report.params;
    assert_eq!(p.brand, "Canon");
    assert_eq!(p.camera_model, "Canon EOS R7");
    assert_eq!(p.aperture, "f/2.8");
    assert_eq!(p.shutter_speed, "1/125s");
    assert_eq!(p.iso, "ISO200");
    assert_eq!(p.focal_length, "35.0mm");
    assert_eq!(p.equivalent_focal_length, "56.0mm");
    assert_eq!(p.author, "@robbb");
}

#[test]
fn frame_file_writes_framed_jpeg() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("shot.jpg");
    let output = tmp.path().join("shot_watermarked.jpg");
    write_jpeg(&source, 800, 600, &canon_exif());

    let report = frame_file(
        &RustBackend::new(),
        &job(source, output.clone(), TemplateStyle::FullFrame),
        &fonts(),
    )
    .unwrap();

    assert_eq!(report.photo.brand, "Canon");
    assert_eq!(
        image::image_dimensions(&output).unwrap(),
        (report.width, report.height)
    );
    assert!(report.width > 800 && report.height > 600);
}

#[test]
fn frame_file_output_is_byte_identical_across_runs() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("shot.jpg");
    write_jpeg(&source, 320, 240, &canon_exif());
    let first = tmp.path().join("first.jpg");
    let second = tmp.path().join("second.jpg");

    for out in [&first, &second] {
        frame_file(
            &RustBackend::new(),
            &job(source.clone(), out.clone(), TemplateStyle::BottomOnly),
            &fonts(),
        )
        .unwrap();
    }

    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn missing_logo_is_a_warning_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("shot.jpg");
    let output = tmp.path().join("out.jpg");
    write_jpeg(&source, 200, 150, &canon_exif());
    let mut job = job(source, output.clone(), TemplateStyle::Classic);
    job.logo = LogoSource::File(tmp.path().join("no-such-logo.png"));

    let report = frame_file(&RustBackend::new(), &job, &fonts()).unwrap();

    assert!(matches!(
        report.warnings.as_slice(),
        [RenderWarning::LogoUnavailable { .. }]
    ));
    assert!(output.exists());
}

#[test]
fn failed_encode_leaves_no_output() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("shot.jpg");
    write_jpeg(&source, 100, 100, &canon_exif());
    let output = tmp.path().join("out.gif");

    let result = frame_file(
        &RustBackend::new(),
        &job(source, output.clone(), TemplateStyle::BottomOnly),
        &fonts(),
    );

    assert!(matches!(result, Err(FrameError::Save(_))));
    assert!(!output.exists());
    let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n != "shot.jpg")
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[test]
fn unreadable_source_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("broken.jpg");
    std::fs::write(&source, b"definitely not a jpeg").unwrap();
    let output = tmp.path().join("out.jpg");

    let result = frame_file(
        &RustBackend::new(),
        &job(source, output.clone(), TemplateStyle::BottomOnly),
        &fonts(),
    );

    assert!(matches!(result, Err(FrameError::Source(_))));
    assert!(!output.exists());
}
