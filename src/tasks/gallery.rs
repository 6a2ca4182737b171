use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio::time::{Duration, Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::GalleryOptions;
use crate::error::LoadError;
use crate::events::{GalleryCommand, GalleryEvent, ImageBatch};
use crate::gallery::{Debouncer, Gallery, LoadOutcome, LoadTicket};
use crate::sources::LoadImages;

type LoadResult = (u64, Result<ImageBatch, LoadError>);

/// Owns the gallery state and serializes every mutation of it.
///
/// - Loads run as spawned tasks; a new load aborts the outstanding one and
///   completions from superseded generations are ignored.
/// - Percentage changes scroll the strip right away and commit the background
///   only after `options.debounce` without a newer change.
/// - Exits on cancellation, or once the command channel is closed and no load
///   or transition is outstanding.
pub async fn run<S>(
    source: S,
    options: GalleryOptions,
    seed: Option<u64>,
    mut commands: Receiver<GalleryCommand>,
    events: Sender<GalleryEvent>,
    cancel: CancellationToken,
) -> Result<()>
where
    S: LoadImages + Clone + 'static,
{
    let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let mut gallery = Gallery::new(options.clone());
    let mut transitions: Debouncer<usize> = Debouncer::new(options.debounce);
    let mut loads: JoinSet<LoadResult> = JoinSet::new();
    let mut commands_open = true;

    if options.initial_count > 0 {
        let ticket = gallery.begin_load_with(options.initial_count);
        start_load(&mut loads, &source, ticket, rng.random(), &events).await;
    }

    loop {
        if !commands_open && loads.is_empty() && !transitions.is_pending() {
            debug!("command channel closed and gallery idle; exiting");
            break;
        }
        let deadline = transitions.deadline();

        select! {
            _ = cancel.cancelled() => break,

            maybe_cmd = commands.recv(), if commands_open => match maybe_cmd {
                Some(GalleryCommand::LoadImages) => {
                    let ticket = gallery.begin_load(&mut rng);
                    start_load(&mut loads, &source, ticket, rng.random(), &events).await;
                }
                Some(GalleryCommand::PercentageChanged(percentage)) => {
                    match gallery.selected_index(percentage) {
                        Some(index) => {
                            debug!(index, percentage = percentage.value(), "selection changed");
                            let _ = events.send(GalleryEvent::ScrolledTo { index }).await;
                            transitions.schedule(index, Instant::now());
                        }
                        None => debug!("no images loaded; ignoring wheel movement"),
                    }
                }
                None => commands_open = false,
            },

            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(index) = transitions.take_due(Instant::now()) {
                    if let Some(image) = gallery.image_at(index).cloned() {
                        debug!(index, "background transition");
                        let _ = events
                            .send(GalleryEvent::BackgroundChanged {
                                index,
                                image,
                                crossfade: options.crossfade,
                            })
                            .await;
                    }
                }
            }

            Some(joined) = loads.join_next() => match joined {
                Ok((generation, result)) => {
                    handle_outcome(
                        gallery.finish_load(generation, result, &mut rng),
                        generation,
                        &gallery,
                        &mut transitions,
                        &events,
                    )
                    .await;
                }
                Err(err) if err.is_cancelled() => debug!("superseded load aborted"),
                Err(err) => error!("load task failed: {err}"),
            },
        }
    }

    loads.shutdown().await;
    Ok(())
}

async fn start_load<S>(
    loads: &mut JoinSet<LoadResult>,
    source: &S,
    ticket: LoadTicket,
    seed: u64,
    events: &Sender<GalleryEvent>,
) where
    S: LoadImages + Clone + 'static,
{
    if !loads.is_empty() {
        info!(generation = ticket.generation, "superseding outstanding load");
        loads.abort_all();
    }
    let source = source.clone();
    let LoadTicket { generation, count } = ticket;
    loads.spawn(async move { (generation, source.load_images(count, seed).await) });
    info!(generation, count, "loading images");
    let _ = events
        .send(GalleryEvent::LoadStarted { generation, count })
        .await;
}

async fn handle_outcome(
    outcome: LoadOutcome,
    generation: u64,
    gallery: &Gallery,
    transitions: &mut Debouncer<usize>,
    events: &Sender<GalleryEvent>,
) {
    match outcome {
        LoadOutcome::Replaced { images, background } => {
            // Pending transitions point into the old set.
            transitions.cancel();
            info!(generation, count = images.len(), background, "image set replaced");
            let _ = events
                .send(GalleryEvent::ThumbnailsReloaded {
                    generation,
                    images,
                })
                .await;
            if let Some(image) = gallery.image_at(background).cloned() {
                let _ = events
                    .send(GalleryEvent::BackgroundChanged {
                        index: background,
                        image,
                        crossfade: Duration::ZERO,
                    })
                    .await;
            }
        }
        LoadOutcome::Failed(error) => {
            error!(generation, "failed to load images: {error}");
            let _ = events
                .send(GalleryEvent::LoadFailed { generation, error })
                .await;
        }
        LoadOutcome::NoImages => warn!(generation, "load returned no images; keeping current set"),
        LoadOutcome::Stale => debug!(generation, "ignoring superseded load"),
    }
}
