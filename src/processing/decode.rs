use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use anyhow::Result;
use image::{ImageReader, RgbaImage, imageops};
use tracing::debug;

/// Decode an image file to RGBA8 and apply its EXIF orientation.
///
/// Orientation handling is best-effort; without metadata the stored
/// orientation is kept.
pub fn decode_file(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let orientation = File::open(path)
        .ok()
        .and_then(|f| read_orientation(&mut BufReader::new(f)))
        .unwrap_or(1);
    if orientation != 1 {
        debug!(orientation, path = %path.display(), "applying exif orientation");
    }
    Ok(apply_orientation(img.to_rgba8(), orientation))
}

/// Decode an in-memory encoded image (e.g. a download) to RGBA8.
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    let orientation = read_orientation(&mut Cursor::new(bytes)).unwrap_or(1);
    Ok(apply_orientation(img.to_rgba8(), orientation))
}

fn read_orientation<R: BufRead + Seek>(reader: &mut R) -> Option<u16> {
    let exif = exif::Reader::new().read_from_container(reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0).map(|v| v as u16)
}

fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        // transpose
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        // transverse
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        _ => img,
    }
}
