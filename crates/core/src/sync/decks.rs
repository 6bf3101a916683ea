//! Deck replica: whole-row replication with last-write-wins merge.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};

use crate::errors::Result;
use crate::models::{ClientId, Deck, DeckEntry};
use crate::remote::RemoteStore;
use crate::store::{CacheStore, Namespace, KEY_DECKS};
use crate::sync::scheduler::Debouncer;

/// Merge remote rows into the local replica.
///
/// Unknown rows are adopted. For a known id the remote row wins only when
/// its timestamp is strictly greater; ties keep the local row. Local-only
/// rows are untouched; they are push candidates, not pull candidates.
/// Returns the number of rows adopted or replaced.
pub fn merge_decks(local: &mut Vec<Deck>, remote: Vec<Deck>) -> usize {
    let mut changed = 0;
    for remote_deck in remote {
        match local.iter_mut().find(|deck| deck.id == remote_deck.id) {
            Some(local_deck) => {
                if remote_deck.updated_at > local_deck.updated_at {
                    *local_deck = remote_deck;
                    changed += 1;
                }
            }
            None => {
                local.push(remote_deck);
                changed += 1;
            }
        }
    }
    changed
}

/// Partition local rows for push: rows with no remote counterpart are
/// inserts; rows strictly newer than their remote counterpart are updates.
pub fn partition_push(local: &[Deck], remote: &[Deck]) -> (Vec<Deck>, Vec<Deck>) {
    let mut inserts = Vec::new();
    let mut updates = Vec::new();
    for deck in local {
        match remote.iter().find(|remote_deck| remote_deck.id == deck.id) {
            None => inserts.push(deck.clone()),
            Some(remote_deck) if deck.updated_at > remote_deck.updated_at => {
                updates.push(deck.clone())
            }
            Some(_) => {}
        }
    }
    (inserts, updates)
}

struct DeckInner {
    decks: RwLock<Vec<Deck>>,
    cache: Arc<dyn CacheStore>,
    remote: Arc<dyn RemoteStore>,
    client_id: ClientId,
}

impl DeckInner {
    fn snapshot(&self) -> Vec<Deck> {
        self.decks.read().unwrap().clone()
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.snapshot();
        self.cache
            .set(Namespace::UserData, KEY_DECKS, serde_json::to_value(&snapshot)?)
            .await
    }

    async fn pull_merge(&self) -> Result<usize> {
        let remote = self.remote.select_decks().await?;
        let mut decks = self.decks.write().unwrap();
        Ok(merge_decks(&mut decks, remote))
    }

    async fn push_with(&self, remote: &[Deck]) -> Result<()> {
        let (inserts, updates) = {
            let decks = self.decks.read().unwrap();
            partition_push(&decks, remote)
        };
        if !inserts.is_empty() {
            self.remote.insert_decks(&inserts).await?;
            debug!("inserted {} decks remotely", inserts.len());
        }
        for deck in &updates {
            self.remote.update_deck(deck).await?;
        }
        if !updates.is_empty() {
            debug!("updated {} decks remotely", updates.len());
        }
        Ok(())
    }

    /// Debounced persist + push.
    async fn write_back(&self) {
        if let Err(err) = self.persist().await {
            warn!("failed to persist deck replica: {err}");
        }
        match self.remote.select_decks().await {
            Ok(remote) => {
                if let Err(err) = self.push_with(&remote).await {
                    warn!("deck push failed: {err}");
                }
            }
            Err(err) => warn!("deck sync fetch failed: {err}"),
        }
    }

    /// Mutate the deck with `id` in place. Stamps the row and schedules
    /// write-back only when `mutate` reports an actual change.
    fn with_deck(&self, id: &str, mutate: impl FnOnce(&mut Deck) -> bool) -> bool {
        let mut decks = self.decks.write().unwrap();
        let Some(deck) = decks.iter_mut().find(|deck| deck.id == id) else {
            return false;
        };
        if !mutate(deck) {
            return false;
        }
        deck.updated_at = Utc::now();
        deck.updated_by_client_id = self.client_id.as_str().to_string();
        true
    }
}

/// Locally held copy of the remote `decks` table, kept eventually consistent
/// via last-write-wins merge at full-row granularity.
///
/// A remote and a local edit to the same deck inside one sync window are not
/// merged field-by-field; the row with the later timestamp wins wholesale and
/// the other edit is lost.
#[derive(Clone)]
pub struct DeckReplica {
    inner: Arc<DeckInner>,
    write_back: Debouncer,
}

impl DeckReplica {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        remote: Arc<dyn RemoteStore>,
        client_id: ClientId,
        window: Duration,
    ) -> Self {
        let inner = Arc::new(DeckInner {
            decks: RwLock::new(Vec::new()),
            cache,
            remote,
            client_id,
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

    pub fn client_id(&self) -> &ClientId {
        &self.inner.client_id
    }

    /// Create an empty deck and return its id.
    pub fn create_deck(&self, name: &str) -> String {
        let deck = Deck::new(name, &self.inner.client_id);
        let id = deck.id.clone();
        self.inner.decks.write().unwrap().push(deck);
        self.write_back.trigger();
        id
    }

    pub fn rename_deck(&self, id: &str, name: &str) {
        let renamed = self.inner.with_deck(id, |deck| {
            deck.name = name.to_string();
            true
        });
        if renamed {
            self.write_back.trigger();
        }
    }

    /// Soft-delete: stamp the tombstone and keep the row merging so the
    /// deletion propagates to other replicas. Tombstones are never purged.
    pub fn delete_deck(&self, id: &str) {
        let deleted = self.inner.with_deck(id, |deck| {
            deck.deleted_at = Some(Utc::now());
            true
        });
        if deleted {
            self.write_back.trigger();
        }
    }

    /// Increment the card's quantity, or add it with quantity 1.
    pub fn add_card(&self, deck_id: &str, card_id: &str) {
        let added = self.inner.with_deck(deck_id, |deck| {
            match deck.cards.iter_mut().find(|entry| entry.id == card_id) {
                Some(entry) => entry.quantity += 1,
                None => deck.cards.push(DeckEntry {
                    id: card_id.to_string(),
                    quantity: 1,
                }),
            }
            true
        });
        if added {
            self.write_back.trigger();
        }
    }

    /// Decrement the card's quantity, removing the entry at zero.
    /// Removing an absent card is a no-op and does not restamp the deck.
    pub fn remove_card(&self, deck_id: &str, card_id: &str) {
        let removed = self.inner.with_deck(deck_id, |deck| {
            let Some(index) = deck.cards.iter().position(|entry| entry.id == card_id) else {
                return false;
            };
            // Adopted remote rows may carry a zero-quantity entry; treat it
            // like an absent card.
            match deck.cards[index].quantity {
                0 => false,
                1 => {
                    deck.cards.remove(index);
                    true
                }
                _ => {
                    deck.cards[index].quantity -= 1;
                    true
                }
            }
        });
        if removed {
            self.write_back.trigger();
        }
    }

    /// All rows including tombstones, i.e. the merge universe.
    pub fn decks(&self) -> Vec<Deck> {
        self.inner.snapshot()
    }

    /// Rows without a deletion stamp, for display.
    pub fn active_decks(&self) -> Vec<Deck> {
        self.inner
            .snapshot()
            .into_iter()
            .filter(|deck| !deck.is_deleted())
            .collect()
    }

    pub fn deck(&self, id: &str) -> Option<Deck> {
        self.inner
            .decks
            .read()
            .unwrap()
            .iter()
            .find(|deck| deck.id == id)
            .cloned()
    }

    /// Fetch all remote rows and merge by last-write-wins.
    /// Failures are logged, never surfaced.
    pub async fn pull_merge(&self) {
        match self.inner.pull_merge().await {
            Ok(changed) if changed > 0 => debug!("merged {changed} remote deck rows"),
            Ok(_) => {}
            Err(err) => warn!("deck pull failed: {err}"),
        }
    }

    /// Replace the in-memory replica with the cached copy, when one exists.
    pub async fn restore_from_cache(&self) {
        match self.inner.cache.get(Namespace::UserData, KEY_DECKS).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decks) => *self.inner.decks.write().unwrap() = decks,
                Err(err) => warn!("cached deck replica is corrupt: {err}"),
            },
            Ok(None) => {}
            Err(err) => warn!("failed to load cached deck replica: {err}"),
        }
    }
}
