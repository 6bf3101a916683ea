//! Adapts the external catalog schema into the internal [`Card`] shape.

use serde::Deserialize;

use crate::models::{Card, CardImages};

/// Image URLs in the external schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCardImages {
    pub full: String,
    pub thumbnail: String,
}

/// One card in the external catalog schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCard {
    pub full_identifier: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub full_name: String,
    /// Newer catalog revisions carry a color list.
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    /// Legacy single-color field, lifted into a list by the adapter.
    #[serde(default)]
    pub color: Option<String>,
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
    #[serde(rename = "type")]
    pub card_type: String,
    pub rarity: String,
    #[serde(default)]
    pub subtypes: Option<Vec<String>>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub flavor_text: Option<String>,
    pub images: ApiCardImages,
    #[serde(default)]
    pub base_id: Option<String>,
    #[serde(default)]
    pub reprint_of_id: Option<String>,
}

/// Full catalog payload returned by the remote catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCatalog {
    pub cards: Vec<ApiCard>,
}

/// Transform the external payload into internal cards.
pub fn adapt_catalog(payload: ApiCatalog) -> Vec<Card> {
    payload.cards.into_iter().map(adapt_card).collect()
}

fn adapt_card(api: ApiCard) -> Card {
    let inks = match api.colors {
        Some(colors) if !colors.is_empty() => colors,
        _ => api.color.into_iter().collect(),
    };

    // A card with no base/reprint linkage is the canonical printing.
    let is_primary_version = api.base_id.is_none() && api.reprint_of_id.is_none();

    Card {
        id: api.full_identifier,
        name: api.name,
        version: api.version,
        full_name: api.full_name,
        inks,
        cost: api.cost,
        lore: api.lore,
        strength: api.strength,
        willpower: api.willpower,
        move_cost: api.move_cost,
        inkwell: api.inkwell,
        types: vec![api.card_type],
        rarity: api.rarity,
        classifications: api.subtypes,
        story: api.story,
        gameplay_text: api.full_text,
        flavor_text: api.flavor_text,
        images: CardImages {
            full: api.images.full,
            small: api.images.thumbnail,
        },
        is_primary_version,
    }
}
