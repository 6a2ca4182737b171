use std::fs;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use fontdb::{Database, Family, Query, Source};
use image::{Rgba, RgbaImage};

/// First usable system sans-serif face.
pub fn load_font() -> Result<FontArc> {
    let mut db = Database::new();
    db.load_system_fonts();

    let preferred_families = [
        Family::Name("DejaVu Sans"),
        Family::Name("Noto Sans"),
        Family::Name("Liberation Sans"),
        Family::SansSerif,
    ];

    for family in preferred_families {
        if let Some(id) = db.query(&Query {
            families: &[family],
            ..Default::default()
        }) && let Some(font) = load_face(&db, id)?
        {
            return Ok(font);
        }
    }

    for face in db.faces() {
        if let Some(font) = load_face(&db, face.id)? {
            return Ok(font);
        }
    }

    Err(anyhow!("no system font available for thumbnail labels"))
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<Option<FontArc>> {
    let face = db.face(id).context("missing font face in database")?;
    // Only the first face of a collection decodes from raw bytes.
    if face.index != 0 {
        return Ok(None);
    }
    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => fs::read(path)
            .with_context(|| format!("failed to read font at {}", path.display()))?,
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    Ok(Some(FontArc::try_from_vec(data).context("failed to decode font face")?))
}

/// Pixel width of `text` at `scale`, kerning included.
pub fn text_width(font: &FontArc, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Draws `text` centered on (`cx`, `cy`), blending into the existing pixels.
/// Destination alpha is left untouched and glyphs are clipped to the image.
pub fn draw_text_centered(
    image: &mut RgbaImage,
    font: &FontArc,
    scale: PxScale,
    cx: f32,
    cy: f32,
    color: [u8; 3],
    text: &str,
) {
    let scaled_font = font.as_scaled(scale);
    let baseline = cy + (scaled_font.ascent() + scaled_font.descent()) / 2.0;
    let mut caret = point(cx - text_width(font, scale, text) / 2.0, baseline);
    let (width, height) = image.dimensions();
    let mut previous = None;
    for ch in text.chars() {
        let glyph_id = scaled_font.glyph_id(ch);
        if let Some(prev) = previous {
            caret.x += scaled_font.kern(prev, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, caret);
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let origin_x = bounds.min.x.floor() as i32;
            let origin_y = bounds.min.y.floor() as i32;
            outlined.draw(|gx, gy, v| {
                let px = origin_x + gx as i32;
                let py = origin_y + gy as i32;
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }
                let dst = image.get_pixel_mut(px as u32, py as u32);
                blend(dst, color, v);
            });
        }
        caret.x += scaled_font.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
}

/// Mixes `color` into `dst` with the given coverage; alpha is kept.
pub fn blend(dst: &mut Rgba<u8>, color: [u8; 3], coverage: f32) {
    let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u16;
    let inv = 255 - alpha;
    for (d, s) in dst.0.iter_mut().zip(color) {
        *d = ((*d as u16 * inv + s as u16 * alpha) / 255) as u8;
    }
}
