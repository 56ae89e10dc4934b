//! Batch framing of a directory tree.
//!
//! Walks the input directory, frames every supported image in parallel, and
//! writes each result under the output directory at the same relative path:
//!
//! ```text
//! photos/                      framed/
//! ├── DSCF0042.JPG     →       ├── DSCF0042_watermarked.JPG
//! └── trip/                    └── trip/
//!     └── IMG_0001.jpg →           └── IMG_0001_watermarked.jpg
//! ```
//!
//! One image failing doesn't stop the run: every image gets an outcome,
//! and the summary reports both sides. Files that already carry the output
//! or preview suffix are skipped, as is anything under the output directory
//! when it sits inside the input tree.
//!
//! Work runs on rayon's global pool; the CLI sizes it from
//! [`ProcessingConfig`](crate::config::ProcessingConfig). Progress is sent
//! as [`BatchEvent`]s over an optional channel so the caller can print as
//! images complete.

use crate::config::MetadataConfig;
use crate::imaging::{
    BackendError, FontSet, FrameError, FrameJob, FrameReport, ImageBackend, LogoSource, Quality,
    WatermarkRequest, frame_file,
};
use crate::naming::{batch_output_path, is_generated, is_supported_image};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot walk input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Everything shared by the jobs of one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub suffix: String,
    pub logo: LogoSource,
    pub request: WatermarkRequest,
    pub metadata: MetadataConfig,
    pub quality: Quality,
}

impl BatchOptions {
    fn job_for(&self, source: &Path) -> FrameJob {
        FrameJob {
            source: source.to_path_buf(),
            output: batch_output_path(source, &self.input_root, &self.output_root, &self.suffix),
            logo: self.logo.clone(),
            request: self.request,
            metadata: self.metadata.clone(),
            quality: self.quality,
        }
    }
}

/// Progress events, emitted as images complete (in completion order).
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started { total: usize },
    Framed(FrameReport),
    Failed { source: PathBuf, error: String },
}

/// Result of one image.
#[derive(Debug)]
pub enum BatchOutcome {
    Framed(FrameReport),
    Failed { source: PathBuf, error: FrameError },
}

impl BatchOutcome {
    pub fn source(&self) -> &Path {
        match self {
            BatchOutcome::Framed(report) => &report.source,
            BatchOutcome::Failed { source, .. } => source,
        }
    }
}

/// Outcomes of a batch run, ordered by source path.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn framed(&self) -> impl Iterator<Item = &FrameReport> {
        self.outcomes.iter().filter_map(|o| match o {
            BatchOutcome::Framed(report) => Some(report),
            BatchOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &FrameError)> {
        self.outcomes.iter().filter_map(|o| match o {
            BatchOutcome::Failed { source, error } => Some((source.as_path(), error)),
            BatchOutcome::Framed(_) => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Supported images under `input_root`, sorted by path.
pub fn collect_images(
    input_root: &Path,
    output_root: &Path,
    suffix: &str,
) -> Result<Vec<PathBuf>, BatchError> {
    if !input_root.is_dir() {
        return Err(BatchError::NotADirectory(input_root.to_path_buf()));
    }
    let mut images = Vec::new();
    let walker = WalkDir::new(input_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.path() != output_root);
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported_image(path) {
            continue;
        }
        if is_generated(path, suffix) {
            log::debug!("skipping generated file {}", path.display());
            continue;
        }
        images.push(path.to_path_buf());
    }
    Ok(images)
}

/// Frame every supported image under `options.input_root`.
pub fn run_batch(
    backend: &impl ImageBackend,
    fonts: &FontSet,
    options: &BatchOptions,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let images = collect_images(&options.input_root, &options.output_root, &options.suffix)?;
    log::info!(
        "framing {} image(s) from {} into {}",
        images.len(),
        options.input_root.display(),
        options.output_root.display()
    );
    if let Some(tx) = &events {
        tx.send(BatchEvent::Started {
            total: images.len(),
        })
        .ok();
    }

    let mut outcomes: Vec<BatchOutcome> = images
        .par_iter()
        .map_with(events, |events, source| {
            let outcome = frame_one(backend, fonts, &options.job_for(source));
            if let Some(tx) = events {
                tx.send(event_for(&outcome)).ok();
            }
            outcome
        })
        .collect();
    outcomes.sort_by(|a, b| a.source().cmp(b.source()));

    let summary = BatchSummary { outcomes };
    log::info!(
        "batch finished: {} framed, {} failed",
        summary.total() - summary.failed_count(),
        summary.failed_count()
    );
    Ok(summary)
}

fn frame_one(backend: &impl ImageBackend, fonts: &FontSet, job: &FrameJob) -> BatchOutcome {
    let result = prepare_output_dir(&job.output)
        .map_err(|e| FrameError::Save(BackendError::Io(e)))
        .and_then(|()| frame_file(backend, job, fonts));
    match result {
        Ok(report) => {
            log::info!("{} -> {}", report.source.display(), report.output.display());
            BatchOutcome::Framed(report)
        }
        Err(error) => {
            log::warn!("{}: {error}", job.source.display());
            BatchOutcome::Failed {
                source: job.source.clone(),
                error,
            }
        }
    }
}

fn prepare_output_dir(output: &Path) -> std::io::Result<()> {
    match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

fn event_for(outcome: &BatchOutcome) -> BatchEvent {
    match outcome {
        BatchOutcome::Framed(report) => BatchEvent::Framed(report.clone()),
        BatchOutcome::Failed { source, error } => BatchEvent::Failed {
            source: source.clone(),
            error: error.to_string(),
        },
    }
}
