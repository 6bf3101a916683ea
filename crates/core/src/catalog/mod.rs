//! Version-checked catalog cache.
//!
//! Catalog flow is one-directional: remote -> version check -> local cache ->
//! in-memory. At most one full catalog download happens per version change;
//! every other session load is a metadata round-trip plus a local read.

mod adapter;

pub use adapter::{adapt_catalog, ApiCard, ApiCardImages, ApiCatalog};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use serde::Deserialize;

use crate::errors::{Error, Result};
use crate::models::Card;
use crate::store::{CacheStore, Namespace, KEY_DATA, KEY_VERSION};

/// Catalog revision token returned by the remote metadata endpoint.
///
/// Opaque: the cached catalog is valid to use iff its stored token equals
/// the token fetched at session start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    pub format_version: String,
}

/// Remote catalog endpoints.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_metadata(&self) -> Result<CatalogMetadata>;

    async fn fetch_catalog(&self) -> Result<ApiCatalog>;
}

/// In-memory catalog with O(1) card resolution.
#[derive(Debug, Default)]
pub struct Catalog {
    cards: Vec<Card>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(cards: Vec<Card>) -> Self {
        let by_id = cards
            .iter()
            .enumerate()
            .map(|(index, card)| (card.id.clone(), index))
            .collect();
        Self { cards, by_id }
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.by_id.get(id).map(|&index| &self.cards[index])
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Loads the catalog, refreshing the local cache on version mismatch.
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    cache: Arc<dyn CacheStore>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn CatalogSource>, cache: Arc<dyn CacheStore>) -> Self {
        Self { source, cache }
    }

    /// Load the catalog.
    ///
    /// Fails with [`Error::MetadataUnreachable`] or
    /// [`Error::CatalogUnreachable`], the only user-visible failure path of
    /// the engine. Cache failures degrade to a remote fetch or to
    /// memory-only operation and are logged.
    pub async fn load(&self) -> Result<Catalog> {
        let metadata = self
            .source
            .fetch_metadata()
            .await
            .map_err(|err| Error::MetadataUnreachable(err.to_string()))?;

        if self.cached_version().await.as_deref() == Some(metadata.format_version.as_str()) {
            if let Some(cards) = self.cached_payload().await {
                return Ok(Catalog::new(cards));
            }
            // Version token present without a payload: first-run interruption
            // or store corruption. Tolerated by refetching.
            warn!(
                "catalog cache has version {} but no payload, refetching",
                metadata.format_version
            );
        }

        self.refresh(&metadata.format_version).await
    }

    async fn cached_version(&self) -> Option<String> {
        match self.cache.get(Namespace::ApiData, KEY_VERSION).await {
            Ok(value) => value.and_then(|v| serde_json::from_value(v).ok()),
            Err(err) => {
                warn!("failed to read cached catalog version: {err}");
                None
            }
        }
    }

    async fn cached_payload(&self) -> Option<Vec<Card>> {
        match self.cache.get(Namespace::ApiData, KEY_DATA).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(cards) => Some(cards),
                Err(err) => {
                    warn!("cached catalog payload is corrupt: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("failed to read cached catalog payload: {err}");
                None
            }
        }
    }

    async fn refresh(&self, version: &str) -> Result<Catalog> {
        let payload = self
            .source
            .fetch_catalog()
            .await
            .map_err(|err| Error::CatalogUnreachable(err.to_string()))?;
        let cards = adapt_catalog(payload);

        // Payload first, version token second: a half-written cache must
        // never claim to be current.
        match self
            .cache
            .set(Namespace::ApiData, KEY_DATA, serde_json::to_value(&cards)?)
            .await
        {
            Ok(()) => {
                if let Err(err) = self
                    .cache
                    .set(
                        Namespace::ApiData,
                        KEY_VERSION,
                        serde_json::Value::String(version.to_string()),
                    )
                    .await
                {
                    warn!("failed to persist catalog version token: {err}");
                }
            }
            Err(err) => warn!("failed to persist catalog payload: {err}"),
        }

        Ok(Catalog::new(cards))
    }
}
