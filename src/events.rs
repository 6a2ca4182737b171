use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;

use crate::error::LoadError;
use crate::wheel::{Percentage, Point};

/// Where a gallery image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    Library(PathBuf),
    Remote(String),
    Synthetic([u8; 3]),
}

#[derive(Debug, Clone)]
pub struct GalleryImage {
    pub origin: ImageOrigin,
    pub pixels: Arc<RgbaImage>,
}

impl GalleryImage {
    pub fn new(origin: ImageOrigin, pixels: RgbaImage) -> Self {
        Self {
            origin,
            pixels: Arc::new(pixels),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Images produced by one load, in delivery order.
pub type ImageBatch = Vec<GalleryImage>;

/// The gallery's current, immutable image set.
pub type ImageSet = Arc<[GalleryImage]>;

/// Raw input on the wheel control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelGesture {
    /// Pointer dragged to a position in wheel-local coordinates.
    Drag(Point),
    Tap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GalleryCommand {
    /// The "load images" trigger was activated.
    LoadImages,
    /// The wheel moved to a new position.
    PercentageChanged(Percentage),
}

#[derive(Debug)]
pub enum GalleryEvent {
    LoadStarted {
        generation: u64,
        count: usize,
    },
    /// A new set replaced the previous one; the strip must be rebuilt.
    ThumbnailsReloaded {
        generation: u64,
        images: ImageSet,
    },
    /// Scroll the strip so `index` is centered.
    ScrolledTo { index: usize },
    /// Show `image` as the full-screen background.
    BackgroundChanged {
        index: usize,
        image: GalleryImage,
        crossfade: Duration,
    },
    LoadFailed {
        generation: u64,
        error: LoadError,
    },
}
