//! Gallery state: the current image set, load bookkeeping and the
//! background-transition debouncer. Owned by a single task; no locking.

use rand::Rng;
use tokio::time::{Duration, Instant};

use crate::config::GalleryOptions;
use crate::error::LoadError;
use crate::events::{GalleryImage, ImageBatch, ImageSet};
use crate::wheel::Percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryPhase {
    Empty,
    Loading,
    Loaded,
}

/// Identifies one load request; only the newest generation may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub count: usize,
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// The set was replaced; `background` is the initial background index.
    Replaced { images: ImageSet, background: usize },
    /// The request failed; the previous set (if any) is kept.
    Failed(LoadError),
    /// The request succeeded without images; the previous set is kept.
    NoImages,
    /// A superseded request completed and was ignored.
    Stale,
}

#[derive(Debug)]
pub struct Gallery {
    options: GalleryOptions,
    images: Option<ImageSet>,
    loading: Option<u64>,
    last_generation: u64,
}

impl Gallery {
    pub fn new(options: GalleryOptions) -> Self {
        Self {
            options,
            images: None,
            loading: None,
            last_generation: 0,
        }
    }

    pub fn phase(&self) -> GalleryPhase {
        if self.loading.is_some() {
            GalleryPhase::Loading
        } else if self.images.is_some() {
            GalleryPhase::Loaded
        } else {
            GalleryPhase::Empty
        }
    }

    pub fn images(&self) -> Option<&ImageSet> {
        self.images.as_ref()
    }

    pub fn image_count(&self) -> usize {
        self.images.as_ref().map_or(0, |set| set.len())
    }

    pub fn image_at(&self, index: usize) -> Option<&GalleryImage> {
        self.images.as_ref()?.get(index)
    }

    /// Start a load of a random size within the configured bounds.
    pub fn begin_load<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LoadTicket {
        let count = rng.random_range(self.options.min_count..=self.options.max_count);
        self.begin_load_with(count)
    }

    /// Start a load of exactly `count` images, superseding any outstanding one.
    pub fn begin_load_with(&mut self, count: usize) -> LoadTicket {
        self.last_generation += 1;
        self.loading = Some(self.last_generation);
        LoadTicket {
            generation: self.last_generation,
            count,
        }
    }

    pub fn finish_load<R: Rng + ?Sized>(
        &mut self,
        generation: u64,
        result: Result<ImageBatch, LoadError>,
        rng: &mut R,
    ) -> LoadOutcome {
        if self.loading != Some(generation) {
            return LoadOutcome::Stale;
        }
        self.loading = None;
        match result {
            Ok(batch) if batch.is_empty() => LoadOutcome::NoImages,
            Ok(batch) => {
                let images: ImageSet = batch.into();
                let background = rng.random_range(0..images.len());
                self.images = Some(images.clone());
                LoadOutcome::Replaced { images, background }
            }
            Err(err) => LoadOutcome::Failed(err),
        }
    }

    /// Index chosen by `percentage`, if any images are loaded.
    pub fn selected_index(&self, percentage: Percentage) -> Option<usize> {
        percentage.index_for(self.image_count())
    }
}

/// Holds at most one pending value; scheduling again replaces it and restarts the delay.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// The pending value once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|at| at <= now) {
            self.cancel()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ImageOrigin;
    use image::RgbaImage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn batch(n: usize) -> ImageBatch {
        (0..n)
            .map(|i| GalleryImage::new(ImageOrigin::Synthetic([i as u8, 0, 0]), RgbaImage::new(1, 1)))
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn empty_to_loading_to_loaded() {
        let mut gallery = Gallery::new(GalleryOptions::default());
        let mut rng = rng();
        assert_eq!(gallery.phase(), GalleryPhase::Empty);
        assert_eq!(gallery.selected_index(Percentage::new(0.5)), None);

        let ticket = gallery.begin_load(&mut rng);
        assert!((10..=20).contains(&ticket.count));
        assert_eq!(gallery.phase(), GalleryPhase::Loading);

        let outcome = gallery.finish_load(ticket.generation, Ok(batch(ticket.count)), &mut rng);
        let LoadOutcome::Replaced { images, background } = outcome else {
            panic!("expected replacement");
        };
        assert_eq!(images.len(), ticket.count);
        assert!(background < ticket.count);
        assert_eq!(gallery.phase(), GalleryPhase::Loaded);
    }

    #[test]
    fn failure_keeps_previous_set() {
        let mut gallery = Gallery::new(GalleryOptions::default());
        let mut rng = rng();
        let first = gallery.begin_load_with(3);
        gallery.finish_load(first.generation, Ok(batch(3)), &mut rng);

        let second = gallery.begin_load_with(5);
        let outcome = gallery.finish_load(
            second.generation,
            Err(LoadError::InvalidRequest("bad".into())),
            &mut rng,
        );
        assert!(matches!(outcome, LoadOutcome::Failed(LoadError::InvalidRequest(_))));
        assert_eq!(gallery.phase(), GalleryPhase::Loaded);
        assert_eq!(gallery.image_count(), 3);
    }

    #[test]
    fn failure_from_empty_stays_empty() {
        let mut gallery = Gallery::new(GalleryOptions::default());
        let ticket = gallery.begin_load_with(3);
        gallery.finish_load(
            ticket.generation,
            Err(LoadError::InvalidRequest("bad".into())),
            &mut rng(),
        );
        assert_eq!(gallery.phase(), GalleryPhase::Empty);
    }

    #[test]
    fn empty_batch_does_not_clear_selection() {
        let mut gallery = Gallery::new(GalleryOptions::default());
        let mut rng = rng();
        let first = gallery.begin_load_with(2);
        gallery.finish_load(first.generation, Ok(batch(2)), &mut rng);
        let second = gallery.begin_load_with(2);
        let outcome = gallery.finish_load(second.generation, Ok(Vec::new()), &mut rng);
        assert!(matches!(outcome, LoadOutcome::NoImages));
        assert_eq!(gallery.selected_index(Percentage::FULL), Some(1));
    }

    #[test]
    fn newer_load_supersedes_older() {
        let mut gallery = Gallery::new(GalleryOptions::default());
        let mut rng = rng();
        let older = gallery.begin_load_with(4);
        let newer = gallery.begin_load_with(2);

        let outcome = gallery.finish_load(older.generation, Ok(batch(4)), &mut rng);
        assert!(matches!(outcome, LoadOutcome::Stale));
        assert_eq!(gallery.phase(), GalleryPhase::Loading);

        gallery.finish_load(newer.generation, Ok(batch(2)), &mut rng);
        assert_eq!(gallery.image_count(), 2);
    }

    #[test]
    fn selection_covers_both_ends() {
        let mut gallery = Gallery::new(GalleryOptions::default());
        let ticket = gallery.begin_load_with(11);
        gallery.finish_load(ticket.generation, Ok(batch(11)), &mut rng());
        assert_eq!(gallery.selected_index(Percentage::ZERO), Some(0));
        assert_eq!(gallery.selected_index(Percentage::new(0.5)), Some(5));
        assert_eq!(gallery.selected_index(Percentage::FULL), Some(10));
    }

    #[test]
    fn debouncer_keeps_only_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        for i in 0..10 {
            debouncer.schedule(i, start + Duration::from_millis(5 * i as u64));
        }
        assert_eq!(debouncer.take_due(start + Duration::from_millis(120)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(145))
        );
        assert_eq!(debouncer.take_due(start + Duration::from_millis(145)), Some(9));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_cancel_drops_pending() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule("a", now);
        assert_eq!(debouncer.cancel(), Some("a"));
        assert_eq!(debouncer.take_due(now + Duration::from_secs(1)), None);
    }
}
