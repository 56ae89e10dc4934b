//! Image processing: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, TIFF, WebP) |
//! | **EXIF tags** | `kamadak-exif`, primary IFD only |
//! | **Orientation** | `image::imageops` rotate / flip |
//! | **Text** | `rusttype` glyph coverage, alpha-blended onto the canvas |
//! | **Logo** | `imageops::resize` (Lanczos3) + `imageops::overlay` |
//! | **Encode** | `JpegEncoder` with quality, `write_to` for the rest |
//!
//! The module is split into:
//! - **Calculations**: pure layout math, one [`Layout`] per render (unit testable)
//! - **Parameters**: data structures describing a frame and a job
//! - **Orientation / text / render**: pixel work on in-memory buffers, no I/O
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: high-level functions combining the above with backend I/O

pub mod backend;
mod calculations;
pub(crate) mod exif_reader;
pub mod operations;
mod orientation;
mod params;
mod render;
pub mod rust_backend;
mod text;

pub use backend::{BackendError, ImageBackend, LoadedImage};
pub use calculations::{Layout, LayoutError, compute_layout, fit_within, scale_to_height};
pub use operations::{
    FrameError, FrameReport, describe_file, frame_file, preview_file, preview_image,
    render_watermark,
};
pub use orientation::{Orientation, SourceImage, normalize_orientation};
pub use params::{CanvasConfig, FrameJob, LogoSource, Quality, RatioConfig, WatermarkRequest};
pub use render::{RenderWarning, render};
pub use rust_backend::{RustBackend, supported_input_extensions};
pub use text::{FontError, FontSet};
