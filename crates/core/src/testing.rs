//! Shared fakes and fixture builders for in-crate tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::catalog::{ApiCatalog, Catalog, CatalogMetadata, CatalogSource};
use crate::errors::{Error, Result};
use crate::models::{Card, CardImages, CollectionChange, Deck, DeckEntry};
use crate::remote::RemoteStore;
use crate::store::{CacheStore, Namespace};

pub fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("test timestamp")
}

pub fn entry(id: &str, quantity: u32) -> DeckEntry {
    DeckEntry {
        id: id.to_string(),
        quantity,
    }
}

pub fn deck_at(id: &str, name: &str, updated_at: DateTime<Utc>) -> Deck {
    Deck {
        id: id.to_string(),
        name: name.to_string(),
        cards: Vec::new(),
        updated_at,
        updated_by_client_id: "client-test".to_string(),
        deleted_at: None,
    }
}

pub fn change(id: &str, card_id: &str, delta: i64) -> CollectionChange {
    CollectionChange {
        id: id.to_string(),
        card_id: card_id.to_string(),
        change: delta,
    }
}

pub fn card(id: &str, inks: &[&str]) -> Card {
    Card {
        id: id.to_string(),
        name: id.to_string(),
        version: None,
        full_name: id.to_string(),
        inks: inks.iter().map(|ink| ink.to_string()).collect(),
        cost: 1,
        lore: None,
        strength: None,
        willpower: None,
        move_cost: None,
        inkwell: true,
        types: vec!["Character".to_string()],
        rarity: "Common".to_string(),
        classifications: None,
        story: None,
        gameplay_text: None,
        flavor_text: None,
        images: CardImages {
            full: format!("https://cards/full/{id}.avif"),
            small: format!("https://cards/small/{id}.avif"),
        },
        is_primary_version: true,
    }
}

pub fn catalog_with(cards: &[(&str, &[&str])]) -> Catalog {
    Catalog::new(cards.iter().map(|(id, inks)| card(id, inks)).collect())
}

/// A card in the external catalog schema, for catalog loader tests.
pub fn api_card_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "fullIdentifier": id,
        "name": id,
        "fullName": id,
        "colors": ["Amber"],
        "cost": 1,
        "inkwell": true,
        "type": "Character",
        "rarity": "Common",
        "images": {"full": "https://cards/full.avif", "thumbnail": "https://cards/small.avif"}
    })
}

/// In-memory [`CacheStore`] fake.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(Namespace, String), serde_json::Value>>,
    fail: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<serde_json::Value>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::cache("store unavailable"));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&(namespace, key.to_string()))
            .cloned())
    }

    async fn set(&self, namespace: Namespace, key: &str, value: serde_json::Value) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::cache("store unavailable"));
        }
        self.entries
            .lock()
            .unwrap()
            .insert((namespace, key.to_string()), value);
        Ok(())
    }
}

/// Scriptable [`RemoteStore`] fake with call counters.
#[derive(Default)]
pub struct FakeRemote {
    decks: Mutex<Vec<Deck>>,
    changes: Mutex<Vec<CollectionChange>>,
    inserted_decks: Mutex<Vec<Deck>>,
    updated_decks: Mutex<Vec<Deck>>,
    inserted_changes: Mutex<Vec<CollectionChange>>,
    deck_selects: AtomicUsize,
    change_selects: AtomicUsize,
    fail_selects: AtomicBool,
    fail_inserts: AtomicBool,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_decks(&self, decks: Vec<Deck>) {
        *self.decks.lock().unwrap() = decks;
    }

    pub fn seed_changes(&self, changes: Vec<CollectionChange>) {
        *self.changes.lock().unwrap() = changes;
    }

    pub fn fail_selects(&self) {
        self.fail_selects.store(true, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn deck_selects(&self) -> usize {
        self.deck_selects.load(Ordering::SeqCst)
    }

    pub fn change_selects(&self) -> usize {
        self.change_selects.load(Ordering::SeqCst)
    }

    pub fn inserted_decks(&self) -> Vec<Deck> {
        self.inserted_decks.lock().unwrap().clone()
    }

    pub fn updated_decks(&self) -> Vec<Deck> {
        self.updated_decks.lock().unwrap().clone()
    }

    pub fn inserted_changes(&self) -> Vec<CollectionChange> {
        self.inserted_changes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn select_decks(&self) -> Result<Vec<Deck>> {
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(Error::remote("remote unavailable"));
        }
        self.deck_selects.fetch_add(1, Ordering::SeqCst);
        Ok(self.decks.lock().unwrap().clone())
    }

    async fn insert_decks(&self, decks: &[Deck]) -> Result<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::remote("insert rejected"));
        }
        self.inserted_decks.lock().unwrap().extend_from_slice(decks);
        self.decks.lock().unwrap().extend_from_slice(decks);
        Ok(())
    }

    async fn update_deck(&self, deck: &Deck) -> Result<()> {
        self.updated_decks.lock().unwrap().push(deck.clone());
        let mut decks = self.decks.lock().unwrap();
        if let Some(row) = decks.iter_mut().find(|row| row.id == deck.id) {
            *row = deck.clone();
        }
        Ok(())
    }

    async fn select_changes(&self) -> Result<Vec<CollectionChange>> {
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(Error::remote("remote unavailable"));
        }
        self.change_selects.fetch_add(1, Ordering::SeqCst);
        Ok(self.changes.lock().unwrap().clone())
    }

    async fn insert_changes(&self, changes: &[CollectionChange]) -> Result<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::remote("insert rejected"));
        }
        self.inserted_changes
            .lock()
            .unwrap()
            .extend_from_slice(changes);
        self.changes.lock().unwrap().extend_from_slice(changes);
        Ok(())
    }
}

/// Scriptable [`CatalogSource`] fake.
pub struct FakeCatalogSource {
    version: Mutex<String>,
    cards: Vec<serde_json::Value>,
    catalog_fetches: AtomicUsize,
    fail_metadata: AtomicBool,
    fail_catalog: AtomicBool,
}

impl FakeCatalogSource {
    pub fn new(version: &str, cards: Vec<serde_json::Value>) -> Self {
        Self {
            version: Mutex::new(version.to_string()),
            cards,
            catalog_fetches: AtomicUsize::new(0),
            fail_metadata: AtomicBool::new(false),
            fail_catalog: AtomicBool::new(false),
        }
    }

    pub fn set_version(&self, version: &str) {
        *self.version.lock().unwrap() = version.to_string();
    }

    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    pub fn fail_metadata(&self) {
        self.fail_metadata.store(true, Ordering::SeqCst);
    }

    pub fn fail_catalog(&self) {
        self.fail_catalog.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogSource for FakeCatalogSource {
    async fn fetch_metadata(&self) -> Result<CatalogMetadata> {
        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(Error::remote("metadata endpoint down"));
        }
        Ok(CatalogMetadata {
            format_version: self.version.lock().unwrap().clone(),
        })
    }

    async fn fetch_catalog(&self) -> Result<ApiCatalog> {
        if self.fail_catalog.load(Ordering::SeqCst) {
            return Err(Error::remote("catalog endpoint down"));
        }
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        let payload = serde_json::json!({ "cards": self.cards });
        Ok(serde_json::from_value(payload).expect("fake catalog payload"))
    }
}
