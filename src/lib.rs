//! # exif-frame
//!
//! Frames photographs with their own shooting parameters. The EXIF tags of
//! an image are normalized into display strings (`f/2.8`, `1/125s`,
//! `ISO200`, `23.0mm`), and a band holding them is drawn below the photo,
//! with every element sized in proportion to the image.
//!
//! # Architecture: Normalize → Lay Out → Render
//!
//! ```text
//! 1. Normalize   raw EXIF tags       →  PhotoParameters   (strings, never missing)
//! 2. Lay out     dimensions + style  →  Layout            (integer geometry)
//! 3. Render      pixels + Layout     →  RgbImage          (canvas, text, logo)
//! ```
//!
//! All three are pure functions on in-memory data. Decoding, EXIF reading
//! and encoding live behind the [`imaging::ImageBackend`] trait, so the
//! pipeline is tested with a mock backend and never touches disk in unit
//! tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | Raw tag map → [`metadata::PhotoParameters`]; per-field fallbacks to `"Unknown"` |
//! | [`imaging`] | Layout math, orientation, text and logo rendering, backend I/O |
//! | [`config`] | `exif-frame.toml` loading, merging onto stock defaults, validation |
//! | [`types`] | [`types::TemplateStyle`] and [`types::Color`], parsed from config and CLI |
//! | [`logos`] | Brand logo discovery in a directory of PNGs |
//! | [`naming`] | Output path conventions (`_watermarked`, `_preview`, batch mirroring) |
//! | [`batch`] | Parallel framing of a directory tree |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Layout, One Renderer
//!
//! Every style goes through [`imaging::compute_layout`]. The renderer only
//! reads a [`imaging::Layout`]; it never recomputes a size. A geometry bug
//! shows up in the layout tests, not in pixels.
//!
//! ## Unknown Is a Value
//!
//! A missing or malformed tag never fails a render. Each field falls back
//! independently, and [`metadata::normalize_report`] says which ones did and
//! why.
//!
//! ## The Source Is Never Resampled
//!
//! The photo is copied onto the canvas pixel for pixel after orientation is
//! applied. Only the logo and the preview are resized.
//!
//! ## Embedded Fonts
//!
//! DejaVu Sans regular and bold are compiled in, so output is identical on
//! every machine unless the config names other faces.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod logos;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
