//! EXIF extraction via `kamadak-exif`.
//!
//! Converts the decoder's typed fields into a [`RawTagMap`] keyed by tag
//! name. Only the primary image's IFDs are read (the thumbnail IFD repeats
//! some tags with different values).
//!
//! | EXIF type | [`TagValue`] |
//! |---|---|
//! | ASCII | `Bytes` (first string; decoding happens in the normalizer) |
//! | BYTE / UNDEFINED | `Bytes` |
//! | SHORT / LONG / SSHORT / SLONG, one value | `Integer` |
//! | RATIONAL / SRATIONAL, one value | `Rational` |
//! | anything multi-valued, FLOAT, DOUBLE | `Text` (decoder's display form) |

use super::orientation::Orientation;
use crate::metadata::{RawTagMap, TagValue, tags};
use exif::{Exif, Field, In, Reader, Value};
use std::io::{BufRead, Seek};

/// Read every primary-image tag from a container the backend can decode
/// (JPEG, TIFF, PNG, WebP).
pub fn read_from_container<R: BufRead + Seek>(reader: &mut R) -> Result<RawTagMap, exif::Error> {
    let exif = Reader::new().read_from_container(reader)?;
    Ok(tags_from_exif(&exif))
}

pub fn tags_from_exif(exif: &Exif) -> RawTagMap {
    exif.fields()
        .filter(|field| field.ifd_num == In::PRIMARY)
        .filter_map(|field| convert(field).map(|value| (field.tag.to_string(), value)))
        .collect()
}

fn convert(field: &Field) -> Option<TagValue> {
    let single_int = |values: Vec<i64>| match values.as_slice() {
        [v] => Some(TagValue::Integer(*v)),
        [] => None,
        _ => Some(TagValue::Text(field.display_value().to_string())),
    };
    match &field.value {
        Value::Ascii(strings) => strings.first().map(|s| TagValue::Bytes(s.clone())),
        Value::Byte(bytes) | Value::Undefined(bytes, _) => Some(TagValue::Bytes(bytes.clone())),
        Value::Short(v) => single_int(v.iter().map(|&x| x as i64).collect()),
        Value::Long(v) => single_int(v.iter().map(|&x| x as i64).collect()),
        Value::SShort(v) => single_int(v.iter().map(|&x| x as i64).collect()),
        Value::SLong(v) => single_int(v.iter().map(|&x| x as i64).collect()),
        Value::Rational(v) => match v.as_slice() {
            [r] => Some(TagValue::Rational {
                num: r.num as i64,
                den: r.denom as i64,
            }),
            [] => None,
            _ => Some(TagValue::Text(field.display_value().to_string())),
        },
        Value::SRational(v) => match v.as_slice() {
            [r] => Some(TagValue::Rational {
                num: r.num as i64,
                den: r.denom as i64,
            }),
            [] => None,
            _ => Some(TagValue::Text(field.display_value().to_string())),
        },
        Value::Float(_) | Value::Double(_) => {
            Some(TagValue::Text(field.display_value().to_string()))
        }
        _ => None,
    }
}

/// Orientation recorded in a tag map; `Normal` when absent or malformed.
pub fn orientation_from_tags(tags: &RawTagMap) -> Orientation {
    match tags.get(tags::ORIENTATION) {
        Some(TagValue::Integer(v)) => u32::try_from(*v)
            .map(Orientation::from_exif)
            .unwrap_or_default(),
        _ => Orientation::Normal,
    }
}
