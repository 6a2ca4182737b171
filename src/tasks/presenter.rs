use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::{GalleryEvent, GalleryImage, ImageSet};
use crate::processing::text::load_font;
use crate::thumbnails::ThumbnailStrip;

pub const BACKGROUND_FILE: &str = "background.png";
pub const STRIP_FILE: &str = "strip.png";

/// Viewport the scroll offsets are reported against.
const STRIP_VIEWPORT_WIDTH: u32 = 1024;

/// Consumes gallery events: logs them and, with an output directory, writes
/// the current background and thumbnail strip as PNG files.
pub async fn run(
    mut events: Receiver<GalleryEvent>,
    strip: ThumbnailStrip,
    output_dir: Option<PathBuf>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut label_font = None;
    if let Some(dir) = &output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        label_font = match tokio::task::spawn_blocking(load_font).await {
            Ok(Ok(font)) => Some(font),
            Ok(Err(err)) => {
                warn!("thumbnail position labels disabled: {err:#}");
                None
            }
            Err(err) => {
                warn!("font lookup task failed: {err}");
                None
            }
        };
    }
    let mut shown = 0usize;

    loop {
        let event = select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            GalleryEvent::LoadStarted { generation, count } => {
                info!(generation, count, "loading");
            }
            GalleryEvent::ThumbnailsReloaded { generation, images } => {
                shown = images.len();
                info!(generation, count = shown, "thumbnails reloaded");
                if let Some(dir) = &output_dir {
                    write_strip(strip, images, label_font.clone(), dir.join(STRIP_FILE)).await;
                }
            }
            GalleryEvent::ScrolledTo { index } => {
                let offset = strip.centered_offset(index, shown, STRIP_VIEWPORT_WIDTH);
                debug!(index, offset, "strip scrolled");
            }
            GalleryEvent::BackgroundChanged {
                index,
                image,
                crossfade,
            } => {
                info!(
                    index,
                    origin = ?image.origin,
                    crossfade_ms = crossfade.as_millis() as u64,
                    "background changed"
                );
                if let Some(dir) = &output_dir {
                    write_background(image, dir.join(BACKGROUND_FILE)).await;
                }
            }
            GalleryEvent::LoadFailed { generation, error } => {
                warn!(generation, network = error.is_network(), "load failed: {error}");
            }
        }
    }
    Ok(())
}

async fn write_strip(
    strip: ThumbnailStrip,
    images: ImageSet,
    font: Option<FontArc>,
    path: PathBuf,
) {
    let result = tokio::task::spawn_blocking(move || -> Result<PathBuf> {
        let canvas = strip.render_strip(&images, font.as_ref())?;
        save_png(&canvas, &path)?;
        Ok(path)
    })
    .await;
    report_write(result);
}

async fn write_background(image: GalleryImage, path: PathBuf) {
    let result = tokio::task::spawn_blocking(move || -> Result<PathBuf> {
        save_png(&image.pixels, &path)?;
        Ok(path)
    })
    .await;
    report_write(result);
}

fn save_png(canvas: &image::RgbaImage, path: &Path) -> Result<()> {
    canvas
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn report_write(result: Result<Result<PathBuf>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(path)) => debug!(path = %path.display(), "wrote image"),
        Ok(Err(err)) => error!("{err:#}"),
        Err(err) => error!("image writer task failed: {err}"),
    }
}
