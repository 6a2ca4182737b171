use anyhow::{Context, Result, bail};
use fast_image_resize as fir;
use image::{RgbaImage, imageops};

use crate::processing::layout::{center_offset, resize_to_cover};

pub fn resize_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    if target_w == 0 || target_h == 0 {
        bail!("resize dimensions must be positive");
    }
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("failed to create source view for resize")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .context("resize failed")?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .context("failed to construct resized RGBA image")
}

/// Scale `source` to fill a `width`×`height` canvas, cropping the overflow
/// around the center (aspect fill).
pub fn aspect_fill(source: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    let (fill_w, fill_h) = resize_to_cover(width, height, source.width(), source.height());
    let resized = resize_rgba(source, fill_w, fill_h)?;
    if fill_w == width && fill_h == height {
        return Ok(resized);
    }
    let (crop_x, crop_y) = center_offset(width, height, fill_w, fill_h);
    Ok(imageops::crop_imm(&resized, crop_x, crop_y, width, height).to_image())
}
