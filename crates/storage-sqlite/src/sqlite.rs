//! SQLite cache store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use inkvault_core::store::{CacheStore, Namespace};
use inkvault_core::Result as CoreResult;

use crate::error::StorageError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache_entries (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
)";

/// Durable cache backed by a single SQLite database file.
///
/// Values are stored as JSON text. All statements run on the blocking pool;
/// the connection is serialized behind a mutex, which is enough for the
/// cache's small, infrequent writes.
#[derive(Debug, Clone)]
pub struct SqliteCacheStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCacheStore {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a transient in-memory cache.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        debug!("Cache database ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, job: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            job(&guard)
        })
        .await
        .map_err(StorageError::Join)?
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, namespace: Namespace, key: &str) -> CoreResult<Option<serde_json::Value>> {
        let key = key.to_string();
        let text: Option<String> = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT value FROM cache_entries WHERE namespace = ?1 AND key = ?2",
                        params![namespace.as_str(), key],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await
            .map_err(inkvault_core::Error::from)?;

        match text {
            Some(text) => {
                let value = serde_json::from_str(&text)
                    .map_err(|e| inkvault_core::Error::from(StorageError::Json(e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, namespace: Namespace, key: &str, value: serde_json::Value) -> CoreResult<()> {
        let key = key.to_string();
        let text = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO cache_entries (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
                params![namespace.as_str(), key, text],
            )?;
            Ok(())
        })
        .await
        .map_err(inkvault_core::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn round_trips_json_values() {
        let store = SqliteCacheStore::open_in_memory().expect("open");

        store
            .set(Namespace::ApiData, "version", json!("v3"))
            .await
            .expect("set");

        let value = store
            .get(Namespace::ApiData, "version")
            .await
            .expect("get");
        assert_eq!(value, Some(json!("v3")));
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = SqliteCacheStore::open_in_memory().expect("open");
        let value = store.get(Namespace::UserData, "decks").await.expect("get");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() {
        let store = SqliteCacheStore::open_in_memory().expect("open");

        store
            .set(Namespace::ApiData, "shared", json!(1))
            .await
            .expect("set api");
        store
            .set(Namespace::UserData, "shared", json!(2))
            .await
            .expect("set user");

        let api = store.get(Namespace::ApiData, "shared").await.expect("get");
        let user = store.get(Namespace::UserData, "shared").await.expect("get");
        assert_eq!(api, Some(json!(1)));
        assert_eq!(user, Some(json!(2)));
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = SqliteCacheStore::open_in_memory().expect("open");

        store
            .set(Namespace::UserData, "decks", json!([{"id": "d1"}]))
            .await
            .expect("first set");
        store
            .set(Namespace::UserData, "decks", json!([]))
            .await
            .expect("second set");

        let value = store.get(Namespace::UserData, "decks").await.expect("get");
        assert_eq!(value, Some(json!([])));
    }
}
