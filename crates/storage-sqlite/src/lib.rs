//! SQLite-backed cache store.
//!
//! Persists catalog payloads and user replicas between sessions as JSON
//! values keyed by (namespace, key). An in-memory variant backs tests and
//! ephemeral sessions.

mod error;
mod memory;
mod sqlite;

pub use error::StorageError;
pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;
