use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::LoadError;
use crate::events::{GalleryImage, ImageBatch, ImageOrigin};
use crate::sources::LoadImages;

/// Flat-color placeholders for running without a library or network.
#[derive(Debug, Clone)]
pub struct MockSource {
    width: u32,
    height: u32,
}

impl MockSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Synthesize exactly `count` opaque images of random colors.
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> ImageBatch {
        (0..count)
            .map(|_| {
                let rgb: [u8; 3] = rng.random();
                let pixels =
                    RgbaImage::from_pixel(self.width, self.height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
                GalleryImage::new(ImageOrigin::Synthetic(rgb), pixels)
            })
            .collect()
    }
}

impl LoadImages for MockSource {
    async fn load_images(&self, count: usize, seed: u64) -> Result<ImageBatch, LoadError> {
        Ok(self.generate(count, &mut StdRng::seed_from_u64(seed)))
    }
}
