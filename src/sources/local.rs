use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand::seq::index;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::events::{GalleryImage, ImageBatch, ImageOrigin};
use crate::processing::decode::decode_file;
use crate::sources::LoadImages;

/// Answer to a photo-library access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    Restricted,
    /// Access to a user-chosen subset only.
    Limited,
    NotDetermined,
}

impl AuthorizationStatus {
    pub fn grants_access(self) -> bool {
        matches!(self, Self::Authorized | Self::Limited)
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authorized => "authorized",
            Self::Denied => "denied",
            Self::Restricted => "restricted",
            Self::Limited => "limited",
            Self::NotDetermined => "not-determined",
        })
    }
}

/// Photo library backed by a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: PathBuf,
    limited_selection: Option<Vec<PathBuf>>,
}

impl DirectoryLibrary {
    pub fn new(root: PathBuf, limited_selection: Option<Vec<PathBuf>>) -> Self {
        Self {
            root,
            limited_selection,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Blocking; inspects the library root.
    pub fn request_authorization(&self) -> AuthorizationStatus {
        let metadata = match fs::metadata(&self.root) {
            Ok(m) => m,
            Err(err) => return status_for_error(&err),
        };
        if !metadata.is_dir() {
            return AuthorizationStatus::Restricted;
        }
        if let Err(err) = fs::read_dir(&self.root) {
            return status_for_error(&err);
        }
        if self.limited_selection.is_some() {
            AuthorizationStatus::Limited
        } else {
            AuthorizationStatus::Authorized
        }
    }

    /// Image assets visible under `status`, sorted by path.
    ///
    /// A root that cannot be walked is an error; unreadable entries below it
    /// are skipped. Limited-selection entries must stay under the root.
    pub fn image_assets(&self, status: AuthorizationStatus) -> Result<Vec<PathBuf>, LoadError> {
        let mut assets = match status {
            AuthorizationStatus::Authorized => self.walk_root()?,
            AuthorizationStatus::Limited => self
                .limited_selection
                .iter()
                .flatten()
                .filter(|rel| {
                    let inside = stays_inside_root(rel);
                    if !inside {
                        warn!(entry = %rel.display(), "ignoring selection entry outside the library root");
                    }
                    inside
                })
                .map(|rel| self.root.join(rel))
                .filter(|p| p.is_file() && is_image(p))
                .collect(),
            _ => Vec::new(),
        };
        assets.sort();
        assets.dedup();
        Ok(assets)
    }

    fn walk_root(&self) -> Result<Vec<PathBuf>, LoadError> {
        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            match entry {
                Ok(e) if e.file_type().is_file() && is_image(e.path()) => assets.push(e.into_path()),
                Ok(_) => {}
                Err(err) if err.depth() == 0 => return Err(LoadError::Library(err.into())),
                Err(err) => debug!("skipping unreadable library entry: {err}"),
            }
        }
        Ok(assets)
    }

    /// Authorize, draw up to `count` distinct assets and decode them.
    #[instrument(skip(self, rng), fields(root = %self.root.display()))]
    pub fn load_blocking<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<ImageBatch, LoadError> {
        let status = self.request_authorization();
        if !status.grants_access() {
            warn!(%status, "photo library access refused");
            return Err(LoadError::PermissionDenied(status));
        }

        let assets = self.image_assets(status)?;
        let amount = count.min(assets.len());
        if amount < count {
            debug!(available = assets.len(), requested = count, "library has fewer assets than requested");
        }

        let mut batch = Vec::with_capacity(amount);
        for i in index::sample(rng, assets.len(), amount) {
            let path = &assets[i];
            match decode_file(path) {
                Ok(pixels) => batch.push(GalleryImage::new(ImageOrigin::Library(path.clone()), pixels)),
                Err(err) => warn!(path = %path.display(), "skipping undecodable asset: {err:#}"),
            }
        }
        info!(%status, loaded = batch.len(), "library images resolved");
        Ok(batch)
    }
}

/// Relative paths without `..`, so joining them onto the root cannot escape it.
fn stays_inside_root(rel: &Path) -> bool {
    rel.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn status_for_error(err: &io::Error) -> AuthorizationStatus {
    match err.kind() {
        io::ErrorKind::NotFound => AuthorizationStatus::NotDetermined,
        io::ErrorKind::PermissionDenied => AuthorizationStatus::Denied,
        _ => AuthorizationStatus::Restricted,
    }
}

#[inline]
fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(OsStr::to_str)
            .map(|s| s.to_ascii_lowercase()),
        Some(ref e) if ["jpg", "jpeg", "png", "webp", "gif", "bmp"].contains(&e.as_str())
    )
}

#[derive(Debug, Clone)]
pub struct LocalSource {
    library: Arc<DirectoryLibrary>,
}

impl LocalSource {
    pub fn new(library: DirectoryLibrary) -> Self {
        Self {
            library: Arc::new(library),
        }
    }

    pub fn library(&self) -> &DirectoryLibrary {
        &self.library
    }
}

impl LoadImages for LocalSource {
    async fn load_images(&self, count: usize, seed: u64) -> Result<ImageBatch, LoadError> {
        let library = Arc::clone(&self.library);
        tokio::task::spawn_blocking(move || {
            library.load_blocking(count, &mut StdRng::seed_from_u64(seed))
        })
        .await
        .map_err(|err| LoadError::Library(io::Error::other(err)))?
    }
}
