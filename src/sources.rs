//! Interchangeable image providers.
//!
//! Every provider answers `load_images(count, seed)` with exactly one outcome:
//! the whole batch or a single error. Problems with individual images only
//! make the batch smaller. `seed` drives every random choice of the request,
//! so equal seeds pick the same assets, keyword or colors.

pub mod local;
pub mod mock;
pub mod remote;

use std::future::Future;

use anyhow::{Context, Result};

use crate::config::{Configuration, ImageSourceKind};
use crate::error::LoadError;
use crate::events::ImageBatch;

pub use local::{AuthorizationStatus, DirectoryLibrary, LocalSource};
pub use mock::MockSource;
pub use remote::RemoteSource;

pub trait LoadImages: Send + Sync {
    fn load_images(
        &self,
        count: usize,
        seed: u64,
    ) -> impl Future<Output = Result<ImageBatch, LoadError>> + Send;
}

/// The provider selected by `image-source`.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Local(LocalSource),
    Remote(RemoteSource),
    Mock(MockSource),
}

impl ImageSource {
    pub fn from_config(cfg: &Configuration) -> Result<Self> {
        Ok(match cfg.image_source {
            ImageSourceKind::Local => {
                let root = cfg
                    .local
                    .library_path
                    .clone()
                    .context("local.library-path is not configured")?;
                Self::Local(LocalSource::new(DirectoryLibrary::new(
                    root,
                    cfg.local.limited_selection.clone(),
                )))
            }
            ImageSourceKind::Remote => Self::Remote(
                RemoteSource::new(&cfg.remote).context("failed to set up remote image source")?,
            ),
            ImageSourceKind::Mock => Self::Mock(MockSource::new(cfg.mock.width, cfg.mock.height)),
        })
    }

    pub fn kind(&self) -> ImageSourceKind {
        match self {
            Self::Local(_) => ImageSourceKind::Local,
            Self::Remote(_) => ImageSourceKind::Remote,
            Self::Mock(_) => ImageSourceKind::Mock,
        }
    }
}

impl LoadImages for ImageSource {
    async fn load_images(&self, count: usize, seed: u64) -> Result<ImageBatch, LoadError> {
        match self {
            Self::Local(source) => source.load_images(count, seed).await,
            Self::Remote(source) => source.load_images(count, seed).await,
            Self::Mock(source) => source.load_images(count, seed).await,
        }
    }
}
