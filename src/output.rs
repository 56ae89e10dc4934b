//! CLI output formatting.
//!
//! Every command's user-facing text is built by a pure `format_*` function
//! returning lines, so the layout is unit tested without capturing stdout.
//! The `print_*` wrappers are the only place that writes.
//!
//! # Output Format
//!
//! ## Frame / preview
//!
//! ```text
//! DSCF0042.JPG → DSCF0042_watermarked.JPG (3000x2250, bottom_only)
//!     Camera: FUJIFILM X-T5
//!     Exposure: 23.0mm f/2.8 1/125s ISO200
//!     Warning: logo logos/fuji.png unavailable (...); rendered without it
//! ```
//!
//! ## Batch
//!
//! ```text
//! [1/3] a.jpg → out/a_watermarked.jpg
//! [2/3] FAILED b.jpg: cannot read source image: ...
//!
//! Framed 2 of 3 images, 1 failed
//!     FAILED b.jpg: cannot read source image: ...
//! ```
//!
//! ## Logos
//!
//! ```text
//! Logos in logos/ (2)
//!     canon.png
//!     nikon.png
//! ```

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::{FrameReport, RenderWarning};
use crate::metadata::PhotoParameters;
use std::path::{Path, PathBuf};

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Frame
// ============================================================================

/// Lines describing one framed image.
pub fn format_frame_report(report: &FrameReport, quiet: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {} ({}x{}, {})",
        file_name(&report.source),
        report.output.display(),
        report.width,
        report.height,
        report.style
    )];
    if quiet {
        return lines;
    }
    lines.push(format!("    Camera: {}", report.photo.camera_line()));
    lines.push(format!("    Exposure: {}", report.photo.exposure_line()));
    lines.extend(format_warnings(&report.warnings));
    lines
}

pub fn format_warnings(warnings: &[RenderWarning]) -> Vec<String> {
    warnings
        .iter()
        .map(|w| format!("    Warning: {w}"))
        .collect()
}

pub fn print_frame_report(report: &FrameReport, quiet: bool) {
    for line in format_frame_report(report, quiet) {
        println!("{line}");
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Progress line for one batch event. `done` counts completed images so far.
pub fn format_batch_event(event: &BatchEvent, done: usize, total: usize) -> String {
    match event {
        BatchEvent::Started { total } => format!("Framing {total} image(s)"),
        BatchEvent::Framed(report) => format!(
            "[{done}/{total}] {} → {}",
            file_name(&report.source),
            report.output.display()
        ),
        BatchEvent::Failed { source, error } => format!(
            "[{done}/{total}] FAILED {}: {error}",
            file_name(source)
        ),
    }
}

/// Final batch summary, listing every failure.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let failed = summary.failed_count();
    let framed = summary.total() - failed;
    let mut lines = vec![String::new()];
    if failed == 0 {
        lines.push(format!("Framed {framed} of {} images", summary.total()));
    } else {
        lines.push(format!(
            "Framed {framed} of {} images, {failed} failed",
            summary.total()
        ));
    }
    for (source, error) in summary.failures() {
        lines.push(format!("    FAILED {}: {error}", source.display()));
    }
    lines
}

pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{line}");
    }
}

// ============================================================================
// Exif / logos
// ============================================================================

pub fn format_parameters_json(params: &PhotoParameters) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(params)
}

pub fn format_logos(dir: &Path, logos: &[PathBuf]) -> Vec<String> {
    if logos.is_empty() {
        return vec![format!("No logos in {}", dir.display())];
    }
    let mut lines = vec![format!("Logos in {} ({})", dir.display(), logos.len())];
    lines.extend(logos.iter().map(|l| format!("    {}", file_name(l))));
    lines
}

pub fn print_logos(dir: &Path, logos: &[PathBuf]) {
    for line in format_logos(dir, logos) {
        println!("{line}");
    }
}
