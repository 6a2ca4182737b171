use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Which image provider feeds the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSourceKind {
    /// Photo library rooted at `local.library-path`.
    Local,
    /// Stock-photo search API at `remote.endpoint`.
    Remote,
    /// Flat-color placeholders, no I/O.
    #[default]
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GalleryOptions {
    /// Smallest batch requested by a load.
    pub min_count: usize,
    /// Largest batch requested by a load.
    pub max_count: usize,
    /// Batch size of the load issued at startup (0 skips it).
    pub initial_count: usize,
    /// Quiet period before a background transition is committed.
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
    /// Crossfade length of a committed background transition.
    #[serde(with = "humantime_serde")]
    pub crossfade: Duration,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            min_count: 10,
            max_count: 20,
            initial_count: 20,
            debounce: Duration::from_millis(100),
            crossfade: Duration::from_millis(100),
        }
    }
}

impl GalleryOptions {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.min_count > 0, "gallery.min-count must be greater than zero");
        ensure!(
            self.min_count <= self.max_count,
            "gallery.min-count ({}) must not exceed gallery.max-count ({})",
            self.min_count,
            self.max_count
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct WheelOptions {
    /// Outer diameter of the ring, in points.
    pub diameter: f64,
    /// Diameter of the draggable button, in points.
    pub button_size: f64,
    pub min_tap_degrees: f64,
    pub max_tap_degrees: f64,
    /// Animation time per degree of tap rotation.
    pub seconds_per_degree: f64,
}

impl Default for WheelOptions {
    fn default() -> Self {
        Self {
            diameter: 240.0,
            button_size: 80.0,
            min_tap_degrees: 15.0,
            max_tap_degrees: 180.0,
            seconds_per_degree: 0.004,
        }
    }
}

impl WheelOptions {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.diameter > 0.0, "wheel.diameter must be positive");
        ensure!(self.button_size > 0.0, "wheel.button-size must be positive");
        ensure!(
            self.min_tap_degrees > 0.0,
            "wheel.min-tap-degrees must be positive"
        );
        ensure!(
            self.min_tap_degrees <= self.max_tap_degrees && self.max_tap_degrees <= 360.0,
            "wheel tap range must satisfy min-tap-degrees <= max-tap-degrees <= 360"
        );
        ensure!(
            self.seconds_per_degree >= 0.0 && self.seconds_per_degree.is_finite(),
            "wheel.seconds-per-degree must be a finite, non-negative number"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ThumbnailOptions {
    /// Edge length of a square strip cell.
    pub item_size: u32,
    /// Gap between neighboring cells.
    pub spacing: u32,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            item_size: 160,
            spacing: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LocalOptions {
    pub library_path: Option<PathBuf>,
    /// Assets (relative to the library root) the user granted limited access to.
    pub limited_selection: Option<Vec<PathBuf>>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RemoteOptions {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub keywords: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

// Keeps the API key out of logged configuration dumps.
impl fmt::Debug for RemoteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteOptions")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("keywords", &self.keywords)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://pixabay.com/api/".to_string(),
            api_key: None,
            keywords: ["waterfall", "trees", "music", "stars"]
                .into_iter()
                .map(String::from)
                .collect(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct MockOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Active image provider.
    pub image_source: ImageSourceKind,
    /// Optional deterministic seed for every random choice.
    pub random_seed: Option<u64>,
    pub gallery: GalleryOptions,
    pub wheel: WheelOptions,
    pub thumbnails: ThumbnailOptions,
    pub local: LocalOptions,
    pub remote: RemoteOptions,
    pub mock: MockOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.gallery.validate()?;
        self.wheel.validate()?;
        ensure!(
            self.thumbnails.item_size > 0,
            "thumbnails.item-size must be greater than zero"
        );
        ensure!(
            self.mock.width > 0 && self.mock.height > 0,
            "mock image dimensions must be positive"
        );
        match self.image_source {
            ImageSourceKind::Local => {
                ensure!(
                    self.local.library_path.is_some(),
                    "local.library-path is required when image-source is local"
                );
            }
            ImageSourceKind::Remote => {
                ensure!(
                    !self.remote.endpoint.trim().is_empty(),
                    "remote.endpoint must not be empty"
                );
                ensure!(
                    self.remote.api_key.as_deref().is_some_and(|k| !k.is_empty()),
                    "remote.api-key is required when image-source is remote"
                );
                ensure!(
                    !self.remote.keywords.is_empty(),
                    "remote.keywords must list at least one keyword"
                );
            }
            ImageSourceKind::Mock => {}
        }
        Ok(self)
    }
}
