//! Domain models shared across the sync engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image URLs for a catalog card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImages {
    pub full: String,
    pub small: String,
}

/// Immutable catalog entry. Owned by the catalog loader and replaced
/// wholesale on catalog refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub full_name: String,
    pub inks: Vec<String>,
    pub cost: i64,
    #[serde(default)]
    pub lore: Option<i64>,
    #[serde(default)]
    pub strength: Option<i64>,
    #[serde(default)]
    pub willpower: Option<i64>,
    #[serde(default)]
    pub move_cost: Option<i64>,
    pub inkwell: bool,
    pub types: Vec<String>,
    pub rarity: String,
    #[serde(default)]
    pub classifications: Option<Vec<String>>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub gameplay_text: Option<String>,
    #[serde(default)]
    pub flavor_text: Option<String>,
    pub images: CardImages,
    /// Marks the canonical printing among reprints sharing a display name.
    pub is_primary_version: bool,
}

/// One (card id, quantity) line of a deck. Quantity is always >= 1; an
/// entry decremented to zero is removed from the deck instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub id: String,
    pub quantity: u32,
}

/// A user deck row as replicated to the remote `decks` table.
///
/// Soft-deleted rows keep their `deleted_at` stamp and continue to take part
/// in merge so the deletion propagates to other replicas (tombstone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub cards: Vec<DeckEntry>,
    pub updated_at: DateTime<Utc>,
    pub updated_by_client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Deck {
    /// Create an empty deck stamped with the current time and client.
    pub fn new(name: impl Into<String>, client_id: &ClientId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            cards: Vec::new(),
            updated_at: Utc::now(),
            updated_by_client_id: client_id.as_str().to_string(),
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Append-only collection ledger entry as stored in the remote `collection`
/// table. Immutable once created; never updated or deleted remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionChange {
    pub id: String,
    pub card_id: String,
    /// Signed quantity delta: +1 acquire, -1 remove.
    pub change: i64,
}

impl CollectionChange {
    /// Create a new ledger entry with a fresh unique id.
    pub fn new(card_id: impl Into<String>, change: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            card_id: card_id.into(),
            change,
        }
    }
}

/// Random per-session client identity, used only to tag deck rows and to
/// self-filter change notifications. Not a durable user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote change event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeEvent {
    Insert,
    Update,
    Delete,
}

/// Remote tables participating in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTable {
    Decks,
    Collection,
}

/// One notification emitted by the remote change channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub event: ChangeEvent,
    pub table: SyncTable,
    /// The affected row in its wire shape. Only inspected for the
    /// originating-client tag; merges always re-fetch the full table.
    #[serde(default)]
    pub new: serde_json::Value,
}

impl ChangeNotification {
    /// The `updated_by_client_id` tag of the notified row, when present.
    pub fn origin_client_id(&self) -> Option<&str> {
        self.new.get("updated_by_client_id").and_then(|v| v.as_str())
    }
}
