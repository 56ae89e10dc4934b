//! Font loading, text measurement, and glyph blending.
//!
//! Text is laid out with `rusttype` and alpha-blended straight onto an
//! RGBA canvas. Widths are measured from glyph advances so a line built
//! from several runs (regular + bold) measures the same as it draws.

use super::render::RenderWarning;
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

static EMBEDDED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static EMBEDDED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} is not a usable TrueType/OpenType font")]
    Invalid(PathBuf),
    #[error("embedded {0} font failed to parse")]
    Embedded(&'static str),
}

/// Regular and bold faces used by every template.
#[derive(Clone)]
pub struct FontSet {
    regular: Font<'static>,
    bold: Font<'static>,
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet")
            .field("glyphs_regular", &self.regular.glyph_count())
            .field("glyphs_bold", &self.bold.glyph_count())
            .finish()
    }
}

impl FontSet {
    /// The bundled DejaVu Sans pair.
    pub fn embedded() -> Result<Self, FontError> {
        Ok(Self {
            regular: embedded_face("regular", EMBEDDED_REGULAR)?,
            bold: embedded_face("bold", EMBEDDED_BOLD)?,
        })
    }

    /// Load configured faces, falling back to the embedded pair per face.
    ///
    /// A configured face that can't be read or parsed is not an error: the
    /// embedded face is used at the same size and a
    /// [`RenderWarning::FontFallback`] is returned.
    pub fn load(
        regular: Option<&Path>,
        bold: Option<&Path>,
    ) -> Result<(Self, Vec<RenderWarning>), FontError> {
        let mut warnings = Vec::new();
        let mut face = |path: Option<&Path>, weight: &'static str, bytes: &'static [u8]| {
            if let Some(path) = path {
                match load_face(path) {
                    Ok(font) => return Ok(font),
                    Err(e) => {
                        log::warn!("{e}; using embedded {weight} font");
                        warnings.push(RenderWarning::FontFallback {
                            path: path.to_path_buf(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            embedded_face(weight, bytes)
        };
        let regular = face(regular, "regular", EMBEDDED_REGULAR)?;
        let bold = face(bold, "bold", EMBEDDED_BOLD)?;
        Ok((Self { regular, bold }, warnings))
    }

    pub fn regular(&self) -> &Font<'static> {
        &self.regular
    }

    pub fn bold(&self) -> &Font<'static> {
        &self.bold
    }
}

fn embedded_face(weight: &'static str, bytes: &'static [u8]) -> Result<Font<'static>, FontError> {
    Font::try_from_bytes(bytes).ok_or(FontError::Embedded(weight))
}

fn load_face(path: &Path) -> Result<Font<'static>, FontError> {
    let data = fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(data).ok_or_else(|| FontError::Invalid(path.to_path_buf()))
}

/// A piece of a line set in one face.
#[derive(Clone, Copy)]
pub struct Run<'a> {
    pub font: &'a Font<'static>,
    pub text: &'a str,
}

impl<'a> Run<'a> {
    pub fn new(font: &'a Font<'static>, text: &'a str) -> Self {
        Self { font, text }
    }
}

/// Advance width of `text` at `size` px.
pub fn text_width(font: &Font<'static>, size: f32, text: &str) -> u32 {
    advance(font, size, text).ceil() as u32
}

/// Advance width of consecutive runs.
pub fn runs_width(runs: &[Run<'_>], size: f32) -> u32 {
    runs.iter()
        .map(|run| advance(run.font, size, run.text))
        .sum::<f32>()
        .ceil() as u32
}

fn advance(font: &Font<'static>, size: f32, text: &str) -> f32 {
    let scale = Scale::uniform(size);
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Draw `text` with its line box's top-left corner at `(x, y)`.
/// Returns the horizontal advance.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &Font<'static>,
    size: f32,
    x: i64,
    y: i64,
    color: Rgba<u8>,
    text: &str,
) -> f32 {
    let scale = Scale::uniform(size);
    let ascent = font.v_metrics(scale).ascent;
    let origin = point(x as f32, y as f32 + ascent);
    let mut width = 0.0f32;

    for glyph in font.layout(text, scale, origin) {
        width = glyph.position().x - x as f32 + glyph.unpositioned().h_metrics().advance_width;
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = bb.min.x as i64 + gx as i64;
            let py = bb.min.y as i64 + gy as i64;
            if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64 {
                return;
            }
            blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
        });
    }
    width
}

/// Draw runs one after another starting at `(x, y)`.
pub fn draw_runs(
    canvas: &mut RgbaImage,
    runs: &[Run<'_>],
    size: f32,
    x: i64,
    y: i64,
    color: Rgba<u8>,
) {
    let mut caret = x as f32;
    for run in runs {
        caret += draw_text(canvas, run.font, size, caret.round() as i64, y, color, run.text);
    }
}

fn blend(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * alpha + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = 255;
}
