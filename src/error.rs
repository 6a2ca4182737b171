use thiserror::Error;

use crate::sources::local::AuthorizationStatus;

/// Failure of a single image-load request.
///
/// Per-image problems inside a batch (a download that fails, a file that does
/// not decode) never surface here; they only shrink the delivered batch.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The photo library refused access.
    #[error("photo library permission denied ({0})")]
    PermissionDenied(AuthorizationStatus),

    /// Transport failure while running the image query.
    #[error("image query failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The image query answered with a non-success status.
    #[error("image query returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The image query body did not have the expected shape.
    #[error("image query response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// The image query could not be built from the configured endpoint.
    #[error("invalid image query: {0}")]
    InvalidRequest(String),

    /// Enumerating the photo library failed.
    #[error(transparent)]
    Library(#[from] std::io::Error),
}

impl LoadError {
    /// Whether the failure came from talking to the remote service.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status(_))
    }
}
