//! Remote durable-store contract for user data.

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{CollectionChange, Deck};

/// The remote `decks` and `collection` tables.
///
/// `decks` supports select-all, insert-batch and update-by-id; `collection`
/// is append-only and supports select-all and insert-batch. The engine never
/// deletes rows remotely; deck deletions propagate as tombstone updates.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select_decks(&self) -> Result<Vec<Deck>>;

    async fn insert_decks(&self, decks: &[Deck]) -> Result<()>;

    async fn update_deck(&self, deck: &Deck) -> Result<()>;

    async fn select_changes(&self) -> Result<Vec<CollectionChange>>;

    async fn insert_changes(&self, changes: &[CollectionChange]) -> Result<()>;
}
