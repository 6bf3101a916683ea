//! Derived views: pure functions joining user data against the catalog.
//!
//! Nothing here is stored; views are recomputed on demand from the current
//! deck/ledger/catalog state. Entries whose card id does not resolve against
//! the catalog are silently dropped; catalog and user data can desync and
//! that is not an error.

use std::collections::{BTreeSet, HashMap};

use crate::catalog::Catalog;
use crate::models::{Card, CollectionChange, Deck};

/// A deck or collection line joined against its catalog card.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub id: String,
    pub quantity: i64,
    pub card: Card,
}

/// Deck with resolved cards and the derived ink-color set.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckView {
    pub id: String,
    pub name: String,
    pub cards: Vec<ResolvedEntry>,
    /// Sorted union of all resolved cards' ink colors.
    pub inks: Vec<String>,
}

/// Collection ownership joined against the catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionView {
    pub cards: Vec<ResolvedEntry>,
}

/// Join one deck against the catalog.
pub fn resolve_deck(deck: &Deck, catalog: &Catalog) -> DeckView {
    let cards: Vec<ResolvedEntry> = deck
        .cards
        .iter()
        .filter_map(|entry| {
            catalog.card(&entry.id).map(|card| ResolvedEntry {
                id: entry.id.clone(),
                quantity: i64::from(entry.quantity),
                card: card.clone(),
            })
        })
        .collect();

    let inks: Vec<String> = cards
        .iter()
        .flat_map(|entry| entry.card.inks.iter().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    DeckView {
        id: deck.id.clone(),
        name: deck.name.clone(),
        cards,
        inks,
    }
}

/// Join all non-deleted decks against the catalog.
pub fn resolve_active_decks(decks: &[Deck], catalog: &Catalog) -> Vec<DeckView> {
    decks
        .iter()
        .filter(|deck| !deck.is_deleted())
        .map(|deck| resolve_deck(deck, catalog))
        .collect()
}

/// Net owned quantity per card id: the sum of all ledger deltas.
pub fn net_quantities(entries: &[CollectionChange]) -> HashMap<String, i64> {
    let mut quantities: HashMap<String, i64> = HashMap::new();
    for entry in entries {
        *quantities.entry(entry.card_id.clone()).or_default() += entry.change;
    }
    quantities
}

/// Join the ledger against the catalog. Cards with a non-positive net
/// quantity are excluded rather than clamped.
pub fn resolve_collection(entries: &[CollectionChange], catalog: &Catalog) -> CollectionView {
    let mut cards: Vec<ResolvedEntry> = net_quantities(entries)
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .filter_map(|(id, quantity)| {
            catalog.card(&id).map(|card| ResolvedEntry {
                id,
                quantity,
                card: card.clone(),
            })
        })
        .collect();

    cards.sort_by(|a, b| a.card.full_name.cmp(&b.card.full_name));

    CollectionView { cards }
}
