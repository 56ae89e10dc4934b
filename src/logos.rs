//! Brand logo discovery.
//!
//! A logo directory is a flat folder of PNGs named after camera makers:
//!
//! ```text
//! logos/
//! ├── canon.png
//! ├── fujifilm.png
//! ├── nikon.png
//! └── sony.png
//! ```
//!
//! A logo matches a photo when its file stem appears, case-insensitively,
//! in the photo's `Make` (`"NIKON CORPORATION"` → `nikon.png`).

use std::fs;
use std::path::{Path, PathBuf};

/// All `*.png` files in `dir`, sorted by path. A missing or unreadable
/// directory yields an empty list.
pub fn list_logos(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        log::debug!("logo directory {} not readable", dir.display());
        return Vec::new();
    };
    let mut logos: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_png(path))
        .collect();
    logos.sort();
    logos
}

/// The logo whose stem is contained in `brand`. When several match, the
/// longest stem wins (`"leica"` over `"lei"`), then the first in sort order.
pub fn logo_for_brand(dir: &Path, brand: &str) -> Option<PathBuf> {
    let brand = brand.to_lowercase();
    list_logos(dir)
        .into_iter()
        .filter_map(|path| {
            let stem = path.file_stem()?.to_string_lossy().to_lowercase();
            (!stem.is_empty() && brand.contains(&stem)).then_some((stem.len(), path))
        })
        .fold(None, |best: Option<(usize, PathBuf)>, candidate| match best {
            Some(b) if b.0 >= candidate.0 => Some(b),
            _ => Some(candidate),
        })
        .map(|(_, path)| path)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}
