//! Error types for the cache store backends.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blocking worker failed
    #[error("Storage worker error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<StorageError> for inkvault_core::Error {
    fn from(err: StorageError) -> Self {
        inkvault_core::Error::CacheUnavailable(err.to_string())
    }
}
