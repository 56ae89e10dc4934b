//! Shared value types used by the config layer, the CLI, and the renderer.
//!
//! Both types here are parsed from user input (config file or command line)
//! and reject anything they don't recognise instead of falling back to a
//! default. A frame the caller didn't ask for is worse than an error.

use image::{Rgb, Rgba};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("unsupported template style '{0}' (expected one of: full_frame, bottom_only, classic)")]
    Unsupported(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid color '{0}': expected #rrggbb or r,g,b")]
    Invalid(String),
}

/// Frame template.
///
/// - `BottomOnly`: the image keeps its edges; a text band is added below.
/// - `FullFrame`: a uniform border on top, left and right, plus the band.
/// - `Classic`: same canvas as `BottomOnly`, but the band holds two
///   columns (shooting parameters left, camera/lens right) split by a
///   vertical rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStyle {
    FullFrame,
    #[default]
    BottomOnly,
    Classic,
}

impl TemplateStyle {
    pub const ALL: [TemplateStyle; 3] = [
        TemplateStyle::FullFrame,
        TemplateStyle::BottomOnly,
        TemplateStyle::Classic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateStyle::FullFrame => "full_frame",
            TemplateStyle::BottomOnly => "bottom_only",
            TemplateStyle::Classic => "classic",
        }
    }

    /// Whether the style draws a border around the image itself.
    pub fn has_border(self) -> bool {
        matches!(self, TemplateStyle::FullFrame)
    }
}

impl FromStr for TemplateStyle {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_frame" => Ok(TemplateStyle::FullFrame),
            "bottom_only" => Ok(TemplateStyle::BottomOnly),
            "classic" => Ok(TemplateStyle::Classic),
            _ => Err(StyleError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for TemplateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque RGB color.
///
/// Serialized as a `#rrggbb` hex string so config files read the same way
/// as CSS colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const WHITE: Color = Color([255, 255, 255]);

    pub fn rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }

    pub fn rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 255])
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = ColorError;

    /// Accepts `#rrggbb`, `rrggbb`, or a comma-separated `r,g,b` triple.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorError::Invalid(s.to_string());
        let trimmed = s.trim();

        if trimmed.contains(',') {
            let parts: Vec<u8> = trimmed
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| invalid())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Color([*r, *g, *b])),
                _ => Err(invalid()),
            };
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Color([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
