use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::WheelOptions;
use crate::events::{GalleryCommand, WheelGesture};
use crate::wheel::{WheelState, WheelUpdate, normalize};

/// Owns the running wheel angle and forwards every new position to the gallery.
pub async fn run(
    mut gestures: Receiver<WheelGesture>,
    to_gallery: Sender<GalleryCommand>,
    options: WheelOptions,
    seed: Option<u64>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let mut wheel = WheelState::new(options);

    loop {
        select! {
            _ = cancel.cancelled() => break,
            gesture = gestures.recv() => {
                let Some(gesture) = gesture else { break };
                let update = match gesture {
                    WheelGesture::Drag(pointer) => wheel.drag(pointer),
                    WheelGesture::Tap => {
                        let (update, rotation) = wheel.tap(&mut rng);
                        debug!(
                            increment = rotation.increment_degrees,
                            duration_ms = rotation.duration.as_millis() as u64,
                            "tap rotation"
                        );
                        update
                    }
                };
                report(&update);
                if to_gallery
                    .send(GalleryCommand::PercentageChanged(update.percentage))
                    .await
                    .is_err()
                {
                    debug!("gallery channel closed; stopping wheel");
                    break;
                }
            }
        }
    }
    Ok(())
}

fn report(update: &WheelUpdate) {
    info!(
        label = %update.label,
        angle = normalize(update.angle),
        percentage = update.percentage.value(),
        button_x = update.button.x,
        button_y = update.button.y,
        "wheel moved"
    );
}
