//! Photographic metadata normalization.
//!
//! EXIF decoders hand back tags whose value type depends on the camera that
//! wrote them: the exposure time may be a rational, a float rendered as
//! text, or an ASCII byte string. This module turns that raw map into a
//! [`PhotoParameters`] record in which every field is a display-ready
//! string.
//!
//! ## Field resolution
//!
//! Each field is extracted independently. The first present source wins:
//!
//! | Field | Tags (in priority order) | Output |
//! |---|---|---|
//! | aperture | `FNumber` | `f/2.8` |
//! | shutter speed | `ExposureTime` | `1/125s` |
//! | iso | `ISOSpeedRatings`, `PhotographicSensitivity` | `ISO200` |
//! | brand / model | `Make` / `Model` | trimmed text |
//! | focal length | `FocalLength` | `35.0mm` plus a crop-factor equivalent |
//! | lens | `LensModel`, `LensInfo`, `LensSpecification`, `Lens` | trimmed text |
//! | capture time | `DateTimeOriginal`, `DateTime`, `DateTimeDigitized` | `2024-05-01 13:45:00` |
//! | author | `Artist` | trimmed text |
//!
//! ## Failure handling
//!
//! Extraction never fails as a whole. Each extractor returns
//! `Result<Option<String>, FieldError>`: `Ok(None)` means the tag is absent,
//! `Err` means it was present but unusable. Either way the field falls back
//! to its default (`"Unknown"`, or the attribution string for the author)
//! and the remaining fields are still attempted. Errors are collected in a
//! [`NormalizeReport`] rather than swallowed, so they stay observable.

use crate::config::MetadataConfig;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Placeholder for any field the image doesn't provide.
pub const UNKNOWN: &str = "Unknown";

/// Attribution used when the image carries no `Artist` tag.
pub const DEFAULT_AUTHOR: &str = "@robbb";

/// Denominator bound when approximating a textual exposure time.
const MAX_SHUTTER_DENOMINATOR: i128 = 1_000_000;

/// EXIF tag names the normalizer reads.
pub mod tags {
    pub const F_NUMBER: &str = "FNumber";
    pub const EXPOSURE_TIME: &str = "ExposureTime";
    pub const ISO: &[&str] = &["ISOSpeedRatings", "PhotographicSensitivity"];
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const FOCAL_LENGTH: &str = "FocalLength";
    pub const LENS: &[&str] = &["LensModel", "LensInfo", "LensSpecification", "Lens"];
    pub const CAPTURE_TIME: &[&str] = &["DateTimeOriginal", "DateTime", "DateTimeDigitized"];
    pub const ARTIST: &str = "Artist";
    pub const ORIENTATION: &str = "Orientation";
}

// ============================================================================
// Raw tag model
// ============================================================================

/// One decoded tag value, in whichever representation the file used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Integer(i64),
    Rational { num: i64, den: i64 },
    Bytes(Vec<u8>),
    Text(String),
}

/// Tag name → value, as produced by an EXIF decoder after numeric-id
/// resolution. Ordered so iteration (and anything derived from it) is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTagMap {
    tags: BTreeMap<String, TagValue>,
}

impl RawTagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. An existing value under the same name is kept, so the
    /// first IFD to report a tag wins.
    pub fn insert(&mut self, name: impl Into<String>, value: TagValue) {
        self.tags.entry(name.into()).or_insert(value);
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, TagValue)> for RawTagMap {
    fn from_iter<I: IntoIterator<Item = (K, TagValue)>>(iter: I) -> Self {
        let mut map = RawTagMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

// ============================================================================
// Normalized record
// ============================================================================

/// Canonical photographic parameters. Every field is always a display-ready
/// string; absent data reads `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoParameters {
    pub brand: String,
    pub camera_model: String,
    pub lens_model: String,
    pub aperture: String,
    pub shutter_speed: String,
    pub iso: String,
    pub focal_length: String,
    pub equivalent_focal_length: String,
    pub capture_time: String,
    pub author: String,
}

impl PhotoParameters {
    /// All fields unknown, author set to the given attribution.
    pub fn unknown(author: &str) -> Self {
        Self {
            brand: UNKNOWN.to_string(),
            camera_model: UNKNOWN.to_string(),
            lens_model: UNKNOWN.to_string(),
            aperture: UNKNOWN.to_string(),
            shutter_speed: UNKNOWN.to_string(),
            iso: UNKNOWN.to_string(),
            focal_length: UNKNOWN.to_string(),
            equivalent_focal_length: UNKNOWN.to_string(),
            capture_time: UNKNOWN.to_string(),
            author: author.to_string(),
        }
    }

    /// `focal aperture shutter iso`, the exposure line shared by every template.
    pub fn exposure_line(&self) -> String {
        [
            &self.focal_length,
            &self.aperture,
            &self.shutter_speed,
            &self.iso,
        ]
        .map(String::as_str)
        .join(" ")
    }

    /// `brand model`, used by the classic template's right column. An
    /// unknown half is left out.
    pub fn camera_line(&self) -> String {
        match (is_unknown(&self.brand), is_unknown(&self.camera_model)) {
            (false, false) => format!("{} {}", self.brand, self.camera_model),
            (false, true) => self.brand.clone(),
            (true, false) => self.camera_model.clone(),
            (true, true) => UNKNOWN.to_string(),
        }
    }
}

impl Default for PhotoParameters {
    fn default() -> Self {
        Self::unknown(DEFAULT_AUTHOR)
    }
}

/// Whether a normalized field holds the placeholder rather than real data.
pub fn is_unknown(value: &str) -> bool {
    value == UNKNOWN
}

// ============================================================================
// Per-field errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{tag}: rational with zero denominator")]
    ZeroDenominator { tag: &'static str },
    #[error("{tag}: '{text}' is not a number")]
    NotANumber { tag: &'static str, text: String },
}

/// The record field an extraction error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Aperture,
    ShutterSpeed,
    Iso,
    Brand,
    CameraModel,
    LensModel,
    FocalLength,
    CaptureTime,
    Author,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Aperture => "aperture",
            Field::ShutterSpeed => "shutter_speed",
            Field::Iso => "iso",
            Field::Brand => "brand",
            Field::CameraModel => "camera_model",
            Field::LensModel => "lens_model",
            Field::FocalLength => "focal_length",
            Field::CaptureTime => "capture_time",
            Field::Author => "author",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: Field,
    pub error: FieldError,
}

/// Normalized parameters plus the fields that fell back because their tag
/// was present but unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeReport {
    pub params: PhotoParameters,
    pub issues: Vec<FieldIssue>,
}

// ============================================================================
// Entry points
// ============================================================================

/// Normalize a raw tag map with the stock metadata settings.
pub fn extract_parameters(tags: &RawTagMap) -> PhotoParameters {
    normalize(tags, &MetadataConfig::default())
}

/// Normalize a raw tag map. Never fails.
pub fn normalize(tags: &RawTagMap, config: &MetadataConfig) -> PhotoParameters {
    normalize_report(tags, config).params
}

/// Normalize a raw tag map, keeping a record of every field that degraded.
pub fn normalize_report(tags: &RawTagMap, config: &MetadataConfig) -> NormalizeReport {
    let mut issues = Vec::new();
    let mut settle = |field: Field, result: Result<Option<String>, FieldError>| match result {
        Ok(value) => value,
        Err(error) => {
            log::debug!("metadata field {field} fell back to default: {error}");
            issues.push(FieldIssue { field, error });
            None
        }
    };

    let brand = settle(Field::Brand, first_text(tags, &[tags::MAKE]));
    let camera_model = settle(Field::CameraModel, first_text(tags, &[tags::MODEL]));
    let aperture = settle(Field::Aperture, aperture(tags));
    let shutter_speed = settle(Field::ShutterSpeed, shutter_speed(tags));
    let iso = settle(Field::Iso, iso(tags));
    let lens_model = settle(Field::LensModel, first_text(tags, tags::LENS));
    let capture_time = settle(Field::CaptureTime, capture_time(tags));
    let author = settle(Field::Author, author(tags));

    let crop_factor = config.crop_factor_for(brand.as_deref().unwrap_or(""));
    let (focal_length, equivalent_focal_length) =
        match settle_pair(&mut issues, focal_lengths(tags, crop_factor)) {
            Some((actual, equivalent)) => (Some(actual), Some(equivalent)),
            None => (None, None),
        };

    let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN.to_string());
    let params = PhotoParameters {
        brand: or_unknown(brand),
        camera_model: or_unknown(camera_model),
        lens_model: or_unknown(lens_model),
        aperture: or_unknown(aperture),
        shutter_speed: or_unknown(shutter_speed),
        iso: or_unknown(iso),
        focal_length: or_unknown(focal_length),
        equivalent_focal_length: or_unknown(equivalent_focal_length),
        capture_time: or_unknown(capture_time),
        author: author.unwrap_or_else(|| config.default_author.clone()),
    };

    NormalizeReport { params, issues }
}

fn settle_pair(
    issues: &mut Vec<FieldIssue>,
    result: Result<Option<(String, String)>, FieldError>,
) -> Option<(String, String)> {
    match result {
        Ok(value) => value,
        Err(error) => {
            log::debug!("metadata field focal_length fell back to default: {error}");
            issues.push(FieldIssue {
                field: Field::FocalLength,
                error,
            });
            None
        }
    }
}

// ============================================================================
// Field extractors
// ============================================================================

fn aperture(tags: &RawTagMap) -> Result<Option<String>, FieldError> {
    let Some(value) = tags.get(tags::F_NUMBER) else {
        return Ok(None);
    };
    let number = numeric(tags::F_NUMBER, value)?;
    if number <= 0.0 {
        return Ok(None);
    }
    Ok(Some(format!("f/{}", format_decimal(number))))
}

fn shutter_speed(tags: &RawTagMap) -> Result<Option<String>, FieldError> {
    let Some(value) = tags.get(tags::EXPOSURE_TIME) else {
        return Ok(None);
    };
    let formatted = match value {
        TagValue::Rational { num, den } => {
            let fraction = Fraction::new(*num as i128, *den as i128).ok_or(
                FieldError::ZeroDenominator {
                    tag: tags::EXPOSURE_TIME,
                },
            )?;
            format!("{fraction}s")
        }
        TagValue::Integer(n) => format!("{n}s"),
        TagValue::Text(text) => shutter_from_text(text),
        TagValue::Bytes(bytes) => shutter_from_text(&decode_lossy(bytes)),
    };
    Ok(Some(formatted))
}

/// Read a textual exposure time as a fraction with a bounded denominator;
/// if it isn't numeric at all, show it verbatim.
fn shutter_from_text(raw: &str) -> String {
    let raw = raw.trim();
    match Fraction::parse(raw).and_then(|f| f.limit_denominator(MAX_SHUTTER_DENOMINATOR)) {
        Some(fraction) => format!("{fraction}s"),
        None => format!("{raw}s"),
    }
}

fn iso(tags: &RawTagMap) -> Result<Option<String>, FieldError> {
    Ok(first_text(tags, tags::ISO)?.map(|v| format!("ISO{v}")))
}

/// Actual and full-frame-equivalent focal length, both to one decimal.
fn focal_lengths(
    tags: &RawTagMap,
    crop_factor: f64,
) -> Result<Option<(String, String)>, FieldError> {
    let Some(value) = tags.get(tags::FOCAL_LENGTH) else {
        return Ok(None);
    };
    let actual = numeric(tags::FOCAL_LENGTH, value)?;
    if actual <= 0.0 {
        return Ok(None);
    }
    let equivalent = actual * crop_factor;
    Ok(Some((
        format!("{actual:.1}mm"),
        format!("{equivalent:.1}mm"),
    )))
}

fn capture_time(tags: &RawTagMap) -> Result<Option<String>, FieldError> {
    let Some(raw) = first_text(tags, tags::CAPTURE_TIME)? else {
        return Ok(None);
    };
    let formatted = NaiveDateTime::parse_from_str(&raw, "%Y:%m:%d %H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or(raw);
    Ok(Some(formatted))
}

fn author(tags: &RawTagMap) -> Result<Option<String>, FieldError> {
    let Some(value) = tags.get(tags::ARTIST) else {
        return Ok(None);
    };
    let text = match value {
        TagValue::Bytes(bytes) => decode_ignoring_invalid(bytes),
        other => text_of(tags::ARTIST, other)?,
    };
    Ok(non_empty(text))
}

// ============================================================================
// Value helpers
// ============================================================================

/// First tag among `names` that is present and non-empty, as trimmed text.
fn first_text(tags: &RawTagMap, names: &[&'static str]) -> Result<Option<String>, FieldError> {
    for &name in names {
        if let Some(value) = tags.get(name) {
            if let Some(text) = non_empty(text_of(name, value)?) {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

fn text_of(tag: &'static str, value: &TagValue) -> Result<String, FieldError> {
    Ok(match value {
        TagValue::Text(text) => text.clone(),
        TagValue::Bytes(bytes) => decode_lossy(bytes),
        TagValue::Integer(n) => n.to_string(),
        TagValue::Rational { num, den } => {
            if *den == 0 {
                return Err(FieldError::ZeroDenominator { tag });
            }
            format_decimal(*num as f64 / *den as f64)
        }
    })
}

fn numeric(tag: &'static str, value: &TagValue) -> Result<f64, FieldError> {
    let parse = |text: &str| {
        let trimmed = text.trim().trim_end_matches("mm").trim();
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FieldError::NotANumber {
                tag,
                text: text.to_string(),
            })
    };
    match value {
        TagValue::Integer(n) => Ok(*n as f64),
        TagValue::Rational { num, den } => {
            if *den == 0 {
                Err(FieldError::ZeroDenominator { tag })
            } else {
                Ok(*num as f64 / *den as f64)
            }
        }
        TagValue::Text(text) => parse(text),
        TagValue::Bytes(bytes) => parse(&decode_lossy(bytes)),
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// UTF-8 with replacement characters; EXIF ASCII padding is stripped.
fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// UTF-8 with invalid sequences dropped.
fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    bytes
        .utf8_chunks()
        .map(|chunk| chunk.valid())
        .collect::<String>()
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Shortest decimal form, at most two places: `2.8`, `8`, `0.33`.
fn format_decimal(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

// ============================================================================
// Fractions
// ============================================================================

/// A reduced fraction with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fraction {
    num: i128,
    den: i128,
}

impl Fraction {
    fn new(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let sign = if den < 0 { -1 } else { 1 };
        let divisor = gcd(num.checked_abs()?, den.checked_abs()?).max(1);
        Some(Self {
            num: sign * num / divisor,
            den: sign * den / divisor,
        })
    }

    /// Parse `a/b`, a plain decimal (`0.004`), or anything `f64` accepts.
    fn parse(text: &str) -> Option<Self> {
        if let Some((n, d)) = text.split_once('/') {
            let num = n.trim().parse::<i128>().ok()?;
            let den = d.trim().parse::<i128>().ok()?;
            return Self::new(num, den);
        }
        Self::parse_decimal(text).or_else(|| {
            const SCALE: i128 = 1_000_000_000_000;
            let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
            let scaled = (value * SCALE as f64).round();
            if scaled.abs() >= i128::MAX as f64 {
                return None;
            }
            Self::new(scaled as i128, SCALE)
        })
    }

    /// Exact conversion of `[-]digits[.digits]`.
    fn parse_decimal(text: &str) -> Option<Self> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty()
            || !all_digits(int_part)
            || !all_digits(frac_part)
            || int_part.len() + frac_part.len() > 30
        {
            return None;
        }
        let digits = format!("{int_part}{frac_part}");
        let num = digits.parse::<i128>().ok()?;
        let den = 10i128.checked_pow(frac_part.len() as u32)?;
        Self::new(if negative { -num } else { num }, den)
    }

    /// Closest fraction whose denominator is at most `max_den`, or `None`
    /// when the search would overflow `i128`.
    fn limit_denominator(self, max_den: i128) -> Option<Self> {
        if self.den <= max_den {
            return Some(self);
        }
        let (mut p0, mut q0, mut p1, mut q1) = (0i128, 1i128, 1i128, 0i128);
        let (mut n, mut d) = (self.num.checked_abs()?, self.den);
        loop {
            let a = n / d;
            let q2 = q0.checked_add(a.checked_mul(q1)?)?;
            if q2 > max_den {
                break;
            }
            let p2 = p0.checked_add(a.checked_mul(p1)?)?;
            (p0, q0, p1, q1) = (p1, q1, p2, q2);
            (n, d) = (d, n - a * d);
            if d == 0 {
                break;
            }
        }
        let k = (max_den - q0) / q1;
        let semiconvergent = (
            p0.checked_add(k.checked_mul(p1)?)?,
            q0.checked_add(k.checked_mul(q1)?)?,
        );
        let convergent = (p1, q1);
        let (target_num, target_den) = (self.num.checked_abs()?, self.den);
        // |p/q - t| scaled by q * target_den
        let error = |(p, q): (i128, i128)| {
            p.checked_mul(target_den)?
                .checked_sub(target_num.checked_mul(q)?)?
                .checked_abs()
        };
        let convergent_error = error(convergent)?.checked_mul(semiconvergent.1)?;
        let semiconvergent_error = error(semiconvergent)?.checked_mul(convergent.1)?;
        let (p, q) = if convergent_error <= semiconvergent_error {
            convergent
        } else {
            semiconvergent
        };
        let p = if self.num < 0 { -p } else { p };
        Self::new(p, q)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::tag_map;

    fn params(entries: Vec<(&str, TagValue)>) -> PhotoParameters {
        extract_parameters(&tag_map(entries))
    }

    fn rational(num: i64, den: i64) -> TagValue {
        TagValue::Rational { num, den }
    }

    fn text(s: &str) -> TagValue {
        TagValue::Text(s.to_string())
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn empty_map_yields_all_defaults() {
        let report = normalize_report(&RawTagMap::new(), &MetadataConfig::default());
        assert_eq!(report.params, PhotoParameters::default());
        assert!(report.issues.is_empty());
        assert_eq!(report.params.author, DEFAULT_AUTHOR);
        assert_eq!(report.params.brand, UNKNOWN);
        assert_eq!(report.params.capture_time, UNKNOWN);
    }

    #[test]
    fn configured_default_author_is_used() {
        let config = MetadataConfig {
            default_author: "studio".into(),
            ..MetadataConfig::default()
        };
        assert_eq!(normalize(&RawTagMap::new(), &config).author, "studio");
    }

    // =========================================================================
    // Aperture
    // =========================================================================

    #[test]
    fn aperture_from_rational() {
        assert_eq!(params(vec![("FNumber", rational(28, 10))]).aperture, "f/2.8");
    }

    #[test]
    fn aperture_whole_number_has_no_decimal() {
        assert_eq!(params(vec![("FNumber", rational(8, 1))]).aperture, "f/8");
    }

    #[test]
    fn aperture_from_text() {
        assert_eq!(params(vec![("FNumber", text("5.6"))]).aperture, "f/5.6");
    }

    // =========================================================================
    // Shutter speed
    // =========================================================================

    #[test]
    fn shutter_rational_is_reduced() {
        assert_eq!(
            params(vec![("ExposureTime", rational(1, 125))]).shutter_speed,
            "1/125s"
        );
        assert_eq!(
            params(vec![("ExposureTime", rational(10, 1250))]).shutter_speed,
            "1/125s"
        );
    }

    #[test]
    fn shutter_rational_whole_seconds() {
        assert_eq!(
            params(vec![("ExposureTime", rational(30, 1))]).shutter_speed,
            "30s"
        );
    }

    #[test]
    fn shutter_decimal_text_becomes_fraction() {
        assert_eq!(
            params(vec![("ExposureTime", text("0.004"))]).shutter_speed,
            "1/250s"
        );
    }

    #[test]
    fn shutter_fraction_text_passes_through_reduced() {
        assert_eq!(
            params(vec![("ExposureTime", text("2/500"))]).shutter_speed,
            "1/250s"
        );
    }

    #[test]
    fn shutter_non_numeric_text_is_kept_verbatim() {
        assert_eq!(
            params(vec![("ExposureTime", text("bulb"))]).shutter_speed,
            "bulbs"
        );
    }

    #[test]
    fn shutter_zero_denominator_degrades_only_that_field() {
        let tags = tag_map(vec![
            ("ExposureTime", rational(1, 0)),
            ("FNumber", rational(4, 1)),
        ]);
        let report = normalize_report(&tags, &MetadataConfig::default());
        assert_eq!(report.params.shutter_speed, UNKNOWN);
        assert_eq!(report.params.aperture, "f/4");
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].field, Field::ShutterSpeed);
    }

    #[test]
    fn limit_denominator_approximates_irrational_input() {
        let f = Fraction::parse("0.3333333333333333").unwrap();
        assert_eq!(f.limit_denominator(10), Fraction::new(1, 3));
    }

    #[test]
    fn fraction_parse_accepts_exponent_form() {
        let f = Fraction::parse("4e-3").unwrap();
        assert_eq!(
            f.limit_denominator(MAX_SHUTTER_DENOMINATOR).unwrap().to_string(),
            "1/250"
        );
    }

    #[test]
    fn shutter_huge_exponent_text_does_not_overflow() {
        let report = normalize_report(
            &tag_map(vec![("ExposureTime", text("1.2345678901234567e25"))]),
            &MetadataConfig::default(),
        );
        assert!(report.params.shutter_speed.ends_with('s'));
        assert_ne!(report.params.shutter_speed, UNKNOWN);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn shutter_fraction_at_i128_limit_is_kept_verbatim() {
        let raw = "-170141183460469231731687303715884105728/1";
        assert_eq!(
            params(vec![("ExposureTime", text(raw))]).shutter_speed,
            format!("{raw}s")
        );
    }

    // =========================================================================
    // ISO, brand, model
    // =========================================================================

    #[test]
    fn iso_from_integer() {
        assert_eq!(params(vec![("ISOSpeedRatings", TagValue::Integer(400))]).iso, "ISO400");
    }

    #[test]
    fn iso_accepts_photographic_sensitivity_alias() {
        assert_eq!(
            params(vec![("PhotographicSensitivity", TagValue::Integer(100))]).iso,
            "ISO100"
        );
    }

    #[test]
    fn brand_and_model_decode_bytes_and_trim_padding() {
        let p = params(vec![
            ("Make", TagValue::Bytes(b"FUJIFILM\0\0".to_vec())),
            ("Model", text("  X-T5 ")),
        ]);
        assert_eq!(p.brand, "FUJIFILM");
        assert_eq!(p.camera_model, "X-T5");
    }

    #[test]
    fn brand_invalid_utf8_is_replaced() {
        let p = params(vec![("Make", TagValue::Bytes(vec![b'N', 0xFF, b'K']))]);
        assert_eq!(p.brand, "N\u{FFFD}K");
    }

    #[test]
    fn empty_brand_is_unknown() {
        assert_eq!(params(vec![("Make", text("   "))]).brand, UNKNOWN);
    }

    // =========================================================================
    // Focal length
    // =========================================================================

    #[test]
    fn canon_uses_larger_crop_factor() {
        let p = params(vec![
            ("Make", text("Canon")),
            ("FocalLength", rational(35, 1)),
        ]);
        assert_eq!(p.focal_length, "35.0mm");
        assert_eq!(p.equivalent_focal_length, "56.0mm");
    }

    #[test]
    fn other_brands_use_default_crop_factor() {
        let p = params(vec![
            ("Make", text("SONY")),
            ("FocalLength", rational(35, 1)),
        ]);
        assert_eq!(p.equivalent_focal_length, "52.5mm");
    }

    #[test]
    fn focal_length_from_integer() {
        let p = params(vec![("FocalLength", TagValue::Integer(50))]);
        assert_eq!(p.focal_length, "50.0mm");
        assert_eq!(p.equivalent_focal_length, "75.0mm");
    }

    #[test]
    fn focal_length_garbage_text_is_reported() {
        let tags = tag_map(vec![("FocalLength", text("wide"))]);
        let report = normalize_report(&tags, &MetadataConfig::default());
        assert_eq!(report.params.focal_length, UNKNOWN);
        assert_eq!(report.params.equivalent_focal_length, UNKNOWN);
        assert!(matches!(
            report.issues[0].error,
            FieldError::NotANumber { tag: "FocalLength", .. }
        ));
    }

    #[test]
    fn custom_crop_factor_table() {
        let mut config = MetadataConfig::default();
        config.crop_factors.insert("olympus".into(), 2.0);
        let tags = tag_map(vec![
            ("Make", text("OLYMPUS IMAGING CORP.")),
            ("FocalLength", rational(25, 1)),
        ]);
        assert_eq!(normalize(&tags, &config).equivalent_focal_length, "50.0mm");
    }

    // =========================================================================
    // Lens, time, author
    // =========================================================================

    #[test]
    fn lens_prefers_lens_model() {
        let p = params(vec![
            ("LensModel", text("XF23mmF1.4 R")),
            ("Lens", text("generic")),
        ]);
        assert_eq!(p.lens_model, "XF23mmF1.4 R");
    }

    #[test]
    fn lens_falls_back_past_empty_values() {
        let p = params(vec![("LensModel", text("")), ("Lens", text("generic"))]);
        assert_eq!(p.lens_model, "generic");
    }

    #[test]
    fn capture_time_is_reformatted() {
        let p = params(vec![("DateTimeOriginal", text("2024:05:01 13:45:00"))]);
        assert_eq!(p.capture_time, "2024-05-01 13:45:00");
    }

    #[test]
    fn capture_time_falls_back_to_file_datetime() {
        let p = params(vec![
            ("DateTime", text("2023:01:02 03:04:05")),
            ("DateTimeDigitized", text("1999:01:01 00:00:00")),
        ]);
        assert_eq!(p.capture_time, "2023-01-02 03:04:05");
    }

    #[test]
    fn unparseable_capture_time_passes_through() {
        let p = params(vec![("DateTimeOriginal", text("last tuesday"))]);
        assert_eq!(p.capture_time, "last tuesday");
    }

    #[test]
    fn author_bytes_drop_invalid_sequences() {
        let p = params(vec![("Artist", TagValue::Bytes(vec![b'J', 0xC3, b'o']))]);
        assert_eq!(p.author, "Jo");
    }

    #[test]
    fn exposure_line_joins_with_spaces() {
        let p = params(vec![
            ("FocalLength", rational(23, 1)),
            ("FNumber", rational(2, 1)),
            ("ExposureTime", rational(1, 60)),
            ("ISOSpeedRatings", TagValue::Integer(800)),
        ]);
        assert_eq!(p.exposure_line(), "23.0mm f/2 1/60s ISO800");
    }

    #[test]
    fn camera_line_drops_unknown_halves() {
        let both = params(vec![("Make", text("Nikon")), ("Model", text("Z 6"))]);
        assert_eq!(both.camera_line(), "Nikon Z 6");
        assert_eq!(params(vec![("Make", text("Nikon"))]).camera_line(), "Nikon");
        assert_eq!(params(vec![("Model", text("Z 6"))]).camera_line(), "Z 6");
        assert_eq!(params(vec![]).camera_line(), UNKNOWN);
    }
}
