//! Local persistent cache contract.

use async_trait::async_trait;

use crate::errors::Result;

/// Key under which the catalog version token is cached.
pub const KEY_VERSION: &str = "version";
/// Key under which the adapted catalog payload is cached.
pub const KEY_DATA: &str = "data";
/// Key under which the deck replica is cached.
pub const KEY_DECKS: &str = "decks";
/// Key under which the collection ledger is cached.
pub const KEY_COLLECTION: &str = "collection";

/// Logical namespaces of the local cache store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Catalog payload and version token.
    ApiData,
    /// Decks and collection ledger.
    UserData,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiData => "api-data",
            Self::UserData => "user-data",
        }
    }
}

/// Asynchronous key-value cache addressed by (namespace, key).
///
/// Implementations store deep-copied JSON snapshots; callers never hand out
/// references aliasing live in-memory state. Failures map to
/// [`crate::Error::CacheUnavailable`] and are caught and logged by callers:
/// a broken cache degrades persistence, it never aborts the session.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<serde_json::Value>>;

    async fn set(&self, namespace: Namespace, key: &str, value: serde_json::Value) -> Result<()>;
}
