//! Collection change ledger: append-only deltas merged by entry-id union.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, warn};

use crate::errors::Result;
use crate::models::CollectionChange;
use crate::remote::RemoteStore;
use crate::store::{CacheStore, Namespace, KEY_COLLECTION};
use crate::sync::scheduler::Debouncer;
use crate::views;

/// Union local and remote entries keyed by entry id.
///
/// Entries are immutable once created, so last-writer questions never arise:
/// the union is idempotent and commutative. Insertion order is preserved for
/// display: local order first, then unseen remote entries.
pub fn merge_entries(
    local: Vec<CollectionChange>,
    remote: Vec<CollectionChange>,
) -> Vec<CollectionChange> {
    let mut seen: HashSet<String> = local.iter().map(|entry| entry.id.clone()).collect();
    let mut merged = local;
    for entry in remote {
        if seen.insert(entry.id.clone()) {
            merged.push(entry);
        }
    }
    merged
}

struct LedgerInner {
    entries: RwLock<Vec<CollectionChange>>,
    cache: Arc<dyn CacheStore>,
    remote: Arc<dyn RemoteStore>,
}

impl LedgerInner {
    fn snapshot(&self) -> Vec<CollectionChange> {
        self.entries.read().unwrap().clone()
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.snapshot();
        self.cache
            .set(
                Namespace::UserData,
                KEY_COLLECTION,
                serde_json::to_value(&snapshot)?,
            )
            .await
    }

    async fn pull_merge(&self) -> Result<usize> {
        let remote = self.remote.select_changes().await?;
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        *entries = merge_entries(std::mem::take(&mut *entries), remote);
        Ok(entries.len() - before)
    }

    /// Debounced persist + push. The remote entry set is fetched once and
    /// shared between the merge-in and the insert-batch derivation, so a
    /// write-back costs a single select round trip.
    async fn write_back(&self) {
        if let Err(err) = self.persist().await {
            warn!("failed to persist collection ledger: {err}");
        }

        let remote = match self.remote.select_changes().await {
            Ok(remote) => remote,
            Err(err) => {
                warn!("collection sync fetch failed: {err}");
                return;
            }
        };

        let to_insert = {
            let remote_ids: HashSet<&str> =
                remote.iter().map(|entry| entry.id.as_str()).collect();
            let mut entries = self.entries.write().unwrap();
            let to_insert: Vec<CollectionChange> = entries
                .iter()
                .filter(|entry| !remote_ids.contains(entry.id.as_str()))
                .cloned()
                .collect();
            *entries = merge_entries(std::mem::take(&mut *entries), remote);
            to_insert
        };

        if to_insert.is_empty() {
            return;
        }
        match self.remote.insert_changes(&to_insert).await {
            Ok(()) => debug!("pushed {} collection entries", to_insert.len()),
            Err(err) => warn!("collection push failed: {err}"),
        }
    }
}

/// Append-only ledger of signed quantity deltas per card.
///
/// Mutations take effect in memory synchronously; persistence and push are
/// debounced. A failed remote operation never loses or rolls back local
/// entries; they are retried by the next natural trigger.
#[derive(Clone)]
pub struct ChangeLedger {
    inner: Arc<LedgerInner>,
    write_back: Debouncer,
}

impl ChangeLedger {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        remote: Arc<dyn RemoteStore>,
        window: Duration,
    ) -> Self {
        let inner = Arc::new(LedgerInner {
            entries: RwLock::new(Vec::new()),
            cache,
            remote,
        });
        let write_back = {
            let inner = inner.clone();
            Debouncer::spawn(window, move || {
                let inner = inner.clone();
                async move { inner.write_back().await }
            })
        };
        Self { inner, write_back }
    }

    /// Append a delta for `card_id` and schedule a debounced persist+push.
    pub fn add_entry(&self, card_id: &str, change: i64) {
        let entry = CollectionChange::new(card_id, change);
        self.inner.entries.write().unwrap().push(entry);
        self.write_back.trigger();
    }

    /// All ledger entries in insertion order, tombstoneless by construction.
    pub fn entries(&self) -> Vec<CollectionChange> {
        self.inner.snapshot()
    }

    /// Net owned quantity per card id.
    pub fn net_quantities(&self) -> HashMap<String, i64> {
        views::net_quantities(&self.inner.snapshot())
    }

    /// Net owned quantity for one card.
    pub fn quantity(&self, card_id: &str) -> i64 {
        self.inner
            .snapshot()
            .iter()
            .filter(|entry| entry.card_id == card_id)
            .map(|entry| entry.change)
            .sum()
    }

    /// Fetch the remote entry set and union it into the local ledger.
    /// Failures are logged, never surfaced.
    pub async fn pull_merge(&self) {
        match self.inner.pull_merge().await {
            Ok(adopted) if adopted > 0 => debug!("adopted {adopted} remote collection entries"),
            Ok(_) => {}
            Err(err) => warn!("collection pull failed: {err}"),
        }
    }

    /// Replace the in-memory ledger with the cached copy, when one exists.
    pub async fn restore_from_cache(&self) {
        match self.inner.cache.get(Namespace::UserData, KEY_COLLECTION).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(entries) => *self.inner.entries.write().unwrap() = entries,
                Err(err) => warn!("cached collection ledger is corrupt: {err}"),
            },
            Ok(None) => {}
            Err(err) => warn!("failed to load cached collection ledger: {err}"),
        }
    }
}
