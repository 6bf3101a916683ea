//! Error types for the sync engine.

use thiserror::Error;

/// Result type alias for sync engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading the catalog or synchronizing user data.
///
/// Only the catalog variants are fatal to their caller; cache and remote
/// failures are caught and logged at the call site so the in-memory state
/// stays authoritative for the session.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog metadata endpoint could not be reached.
    #[error("catalog metadata unreachable: {0}")]
    MetadataUnreachable(String),

    /// The full catalog endpoint could not be reached.
    #[error("catalog unreachable: {0}")]
    CatalogUnreachable(String),

    /// The local persistent cache failed to open, read or write.
    #[error("local cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A remote push or pull failed.
    #[error("remote sync failed: {0}")]
    RemoteSync(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a cache-unavailable error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheUnavailable(message.into())
    }

    /// Create a remote-sync error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteSync(message.into())
    }

    /// True when the error is fatal to the initial catalog load.
    pub fn is_catalog_fatal(&self) -> bool {
        matches!(
            self,
            Self::MetadataUnreachable(_) | Self::CatalogUnreachable(_)
        )
    }
}
