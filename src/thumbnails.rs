//! Geometry and rendering of the horizontal thumbnail strip.

use ab_glyph::{FontArc, PxScale};
use anyhow::Result;
use image::{Rgba, RgbaImage, imageops};

use crate::config::ThumbnailOptions;
use crate::events::GalleryImage;
use crate::processing::resize::aspect_fill;
use crate::processing::text::{blend, draw_text_centered};

const BORDER_PX: u32 = 4;
const BORDER_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CORNER_RADIUS: f32 = 8.0;

/// Badge square edge, and its offset from the cell's right and bottom edges.
const BADGE_SIZE: u32 = 20;
const BADGE_INSET: u32 = 30;
const BADGE_COLOR: [u8; 3] = [255, 255, 255];
const BADGE_OPACITY: f32 = 0.2;
const LABEL_PX: f32 = 10.0;
const LABEL_COLOR: [u8; 3] = [0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailStrip {
    item_size: u32,
    spacing: u32,
}

impl ThumbnailStrip {
    pub fn new(item_size: u32, spacing: u32) -> Self {
        Self {
            item_size: item_size.max(1),
            spacing,
        }
    }

    pub fn from_options(options: &ThumbnailOptions) -> Self {
        Self::new(options.item_size, options.spacing)
    }

    pub fn item_size(&self) -> u32 {
        self.item_size
    }

    /// Total scrollable width of `count` cells.
    pub fn content_width(&self, count: usize) -> u32 {
        if count == 0 {
            return 0;
        }
        let n = count as u32;
        n * self.item_size + (n - 1) * self.spacing
    }

    /// Left edge of the cell at `index`.
    pub fn item_origin(&self, index: usize) -> u32 {
        index as u32 * (self.item_size + self.spacing)
    }

    /// Scroll offset that centers `index` in a viewport, clamped to the content.
    pub fn centered_offset(&self, index: usize, count: usize, viewport_width: u32) -> u32 {
        let content = self.content_width(count);
        let max_offset = content.saturating_sub(viewport_width);
        let center = self.item_origin(index) + self.item_size / 2;
        center.saturating_sub(viewport_width / 2).min(max_offset)
    }

    /// Square aspect-filled cell with rounded corners, a white border and,
    /// when the cell is large enough, a badge with its 1-based `position`.
    /// Without a font the badge is drawn unlabeled.
    pub fn render_thumbnail(
        &self,
        image: &GalleryImage,
        position: usize,
        font: Option<&FontArc>,
    ) -> Result<RgbaImage> {
        let mut cell = aspect_fill(&image.pixels, self.item_size, self.item_size)?;
        let side = self.item_size as f32;
        let border = BORDER_PX.min(self.item_size / 2) as f32;
        let outer_radius = CORNER_RADIUS.min(side / 2.0);
        let inner_radius = (outer_radius - border).max(0.0);
        for (x, y, px) in cell.enumerate_pixels_mut() {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            if rounded_square_distance(cx, cy, border, side - border, inner_radius) > 0.0 {
                *px = BORDER_COLOR;
            }
            let outside = rounded_square_distance(cx, cy, 0.0, side, outer_radius);
            let coverage = (0.5 - outside).clamp(0.0, 1.0);
            px[3] = (f32::from(px[3]) * coverage).round() as u8;
        }
        if self.item_size >= BADGE_INSET {
            draw_badge(&mut cell, position, font);
        }
        Ok(cell)
    }

    /// Every thumbnail laid out left to right on a transparent canvas.
    pub fn render_strip(&self, images: &[GalleryImage], font: Option<&FontArc>) -> Result<RgbaImage> {
        let mut canvas = RgbaImage::new(self.content_width(images.len()).max(1), self.item_size);
        for (index, image) in images.iter().enumerate() {
            let cell = self.render_thumbnail(image, index + 1, font)?;
            imageops::overlay(&mut canvas, &cell, i64::from(self.item_origin(index)), 0);
        }
        Ok(canvas)
    }
}

/// Translucent disc near the bottom-right corner carrying the position label.
fn draw_badge(cell: &mut RgbaImage, position: usize, font: Option<&FontArc>) {
    let origin = cell.width() - BADGE_INSET;
    let radius = BADGE_SIZE as f32 / 2.0;
    let center = origin as f32 + radius;
    for y in origin..origin + BADGE_SIZE {
        for x in origin..origin + BADGE_SIZE {
            let (dx, dy) = (x as f32 + 0.5 - center, y as f32 + 0.5 - center);
            let coverage = (0.5 - ((dx * dx + dy * dy).sqrt() - radius)).clamp(0.0, 1.0);
            blend(cell.get_pixel_mut(x, y), BADGE_COLOR, coverage * BADGE_OPACITY);
        }
    }
    if let Some(font) = font {
        draw_text_centered(
            cell,
            font,
            PxScale::from(LABEL_PX),
            center,
            center,
            LABEL_COLOR,
            &position.to_string(),
        );
    }
}

/// Signed distance from (`x`, `y`) to the square spanning `min..max` on both
/// axes with corners rounded by `radius`; positive outside.
fn rounded_square_distance(x: f32, y: f32, min: f32, max: f32, radius: f32) -> f32 {
    let nx = x.clamp(min + radius, max - radius);
    let ny = y.clamp(min + radius, max - radius);
    let (dx, dy) = (x - nx, y - ny);
    (dx * dx + dy * dy).sqrt() - radius
}
