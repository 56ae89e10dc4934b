//! EXIF orientation handling.
//!
//! Cameras store pixels in sensor order and record how to display them in
//! the `Orientation` tag. Frames are laid out from the *displayed*
//! dimensions, so the buffer is transformed to upright before layout.

use image::DynamicImage;

/// The eight EXIF orientations (tag values 1–8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Map an EXIF tag value. Anything outside 1–8 is treated as `Normal`.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    pub fn to_exif(self) -> u32 {
        match self {
            Orientation::Normal => 1,
            Orientation::FlipHorizontal => 2,
            Orientation::Rotate180 => 3,
            Orientation::FlipVertical => 4,
            Orientation::Transpose => 5,
            Orientation::Rotate90 => 6,
            Orientation::Transverse => 7,
            Orientation::Rotate270 => 8,
        }
    }

    /// Whether applying this orientation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }

    /// Transform pixels from stored order to display order.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.rotate90().fliph(),
            Orientation::Rotate90 => img.rotate90(),
            Orientation::Transverse => img.rotate270().fliph(),
            Orientation::Rotate270 => img.rotate270(),
        }
    }
}

/// Decoded pixels together with their pending orientation instruction.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: DynamicImage,
    pub orientation: Orientation,
}

impl SourceImage {
    pub fn new(pixels: DynamicImage, orientation: Orientation) -> Self {
        Self {
            pixels,
            orientation,
        }
    }

    /// Display dimensions, after the orientation would be applied.
    pub fn display_dimensions(&self) -> (u32, u32) {
        let (w, h) = (self.pixels.width(), self.pixels.height());
        if self.orientation.swaps_dimensions() {
            (h, w)
        } else {
            (w, h)
        }
    }
}

/// Bake the orientation into the pixels and reset it to `Normal`.
/// Applying it twice is the same as applying it once.
pub fn normalize_orientation(source: SourceImage) -> SourceImage {
    let pixels = source.orientation.apply(source.pixels);
    SourceImage::new(pixels, Orientation::Normal)
}
