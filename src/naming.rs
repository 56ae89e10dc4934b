//! Output path conventions.
//!
//! Framed copies sit beside their source with a suffix on the stem, keeping
//! the original extension so the encoder matches the input format:
//! - `DSCF0042.JPG` → `DSCF0042_watermarked.JPG`
//! - `DSCF0042.JPG` (preview) → `DSCF0042_preview.JPG`
//!
//! In batch mode the same file name is placed under the output directory,
//! mirroring the input tree.

use crate::imaging::supported_input_extensions;
use std::path::{Path, PathBuf};

pub const PREVIEW_SUFFIX: &str = "_preview";

/// `<dir>/<stem><suffix>.<ext>` for a source path.
pub fn suffixed_path(input: &Path, suffix: &str) -> PathBuf {
    input.with_file_name(suffixed_file_name(input, suffix))
}

/// `<stem><suffix>.<ext>`; files without an extension get `.jpg`.
pub fn suffixed_file_name(input: &Path, suffix: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy())
        .unwrap_or("jpg".into());
    format!("{stem}{suffix}.{ext}")
}

/// Default output for `frame`.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    suffixed_path(input, suffix)
}

/// Default output for `preview`.
pub fn preview_output_path(input: &Path) -> PathBuf {
    suffixed_path(input, PREVIEW_SUFFIX)
}

/// Output for a batch input: its path relative to `input_root`, placed under
/// `output_root`, with the suffix applied.
pub fn batch_output_path(
    input: &Path,
    input_root: &Path,
    output_root: &Path,
    suffix: &str,
) -> PathBuf {
    let relative = input.strip_prefix(input_root).unwrap_or(input);
    let parent = relative.parent().unwrap_or(Path::new(""));
    output_root
        .join(parent)
        .join(suffixed_file_name(input, suffix))
}

/// Whether the path has an extension we can decode (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Whether a file name already carries an output suffix, so batch runs
/// over a directory that holds earlier output don't frame frames.
pub fn is_generated(path: &Path, suffix: &str) -> bool {
    path.file_stem()
        .map(|s| s.to_string_lossy())
        .is_some_and(|stem| stem.ends_with(suffix) || stem.ends_with(PREVIEW_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_keeps_extension() {
        assert_eq!(
            default_output_path(Path::new("/photos/DSCF0042.JPG"), "_watermarked"),
            PathBuf::from("/photos/DSCF0042_watermarked.JPG")
        );
    }

    #[test]
    fn relative_input_stays_relative() {
        assert_eq!(
            default_output_path(Path::new("shot.png"), "_framed"),
            PathBuf::from("shot_framed.png")
        );
    }

    #[test]
    fn missing_extension_defaults_to_jpg() {
        assert_eq!(
            suffixed_file_name(Path::new("raw_export"), "_watermarked"),
            "raw_export_watermarked.jpg"
        );
    }

    #[test]
    fn preview_path() {
        assert_eq!(
            preview_output_path(Path::new("a/b.jpeg")),
            PathBuf::from("a/b_preview.jpeg")
        );
    }

    #[test]
    fn batch_output_mirrors_tree() {
        assert_eq!(
            batch_output_path(
                Path::new("/in/2024/trip/x.jpg"),
                Path::new("/in"),
                Path::new("/out"),
                "_watermarked"
            ),
            PathBuf::from("/out/2024/trip/x_watermarked.jpg")
        );
    }

    #[test]
    fn batch_output_at_root() {
        assert_eq!(
            batch_output_path(
                Path::new("/in/x.tif"),
                Path::new("/in"),
                Path::new("/out"),
                "_w"
            ),
            PathBuf::from("/out/x_w.tif")
        );
    }

    #[test]
    fn supported_image_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a.JPG")));
        assert!(is_supported_image(Path::new("a.webp")));
        assert!(!is_supported_image(Path::new("a.txt")));
        assert!(!is_supported_image(Path::new("README")));
    }

    #[test]
    fn generated_files_are_recognised() {
        assert!(is_generated(Path::new("x_watermarked.jpg"), "_watermarked"));
        assert!(is_generated(Path::new("x_preview.jpg"), "_watermarked"));
        assert!(!is_generated(Path::new("x.jpg"), "_watermarked"));
    }
}
