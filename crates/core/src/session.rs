//! Session wiring: catalog load, cache restore, initial merges, listener.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::{Catalog, CatalogService, CatalogSource};
use crate::errors::Result;
use crate::models::{ChangeNotification, ClientId};
use crate::remote::RemoteStore;
use crate::store::CacheStore;
use crate::sync::{spawn_listener, ChangeLedger, DeckReplica, DEFAULT_DEBOUNCE_WINDOW};
use crate::views::{self, CollectionView, DeckView};

/// Process-scoped configuration injected into the sync components.
///
/// The client id tags deck rows and self-filters notifications; tests pass a
/// fixed id and a fake remote instead of relying on ambient globals.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub client_id: ClientId,
    pub debounce_window: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            client_id: ClientId::generate(),
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

/// One application session: loaded catalog plus the live sync components.
pub struct SyncSession {
    catalog: Catalog,
    decks: DeckReplica,
    ledger: ChangeLedger,
    listener: JoinHandle<()>,
}

impl SyncSession {
    /// Start a session.
    ///
    /// The catalog load is the only fatal step: without a catalog there is
    /// nothing to display. Cache restores and the initial pull-merges are
    /// best-effort: their failures are logged inside the components and the
    /// session starts with whatever state is available.
    pub async fn start(
        config: SyncConfig,
        source: Arc<dyn CatalogSource>,
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn CacheStore>,
        notifications: mpsc::Receiver<ChangeNotification>,
    ) -> Result<Self> {
        let catalog = CatalogService::new(source, cache.clone()).load().await?;

        let decks = DeckReplica::new(
            cache.clone(),
            remote.clone(),
            config.client_id,
            config.debounce_window,
        );
        let ledger = ChangeLedger::new(cache, remote, config.debounce_window);

        decks.restore_from_cache().await;
        ledger.restore_from_cache().await;

        ledger.pull_merge().await;
        decks.pull_merge().await;

        let listener = spawn_listener(
            notifications,
            decks.clone(),
            ledger.clone(),
            config.debounce_window,
        );

        Ok(Self {
            catalog,
            decks,
            ledger,
            listener,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn decks(&self) -> &DeckReplica {
        &self.decks
    }

    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    /// Active decks joined against the catalog.
    pub fn deck_views(&self) -> Vec<DeckView> {
        views::resolve_active_decks(&self.decks.decks(), &self.catalog)
    }

    /// Collection ownership joined against the catalog.
    pub fn collection_view(&self) -> CollectionView {
        views::resolve_collection(&self.ledger.entries(), &self.catalog)
    }

    /// The listener task handle. The listener has no terminal state; this
    /// exists so embedders can observe an unexpected exit.
    pub fn listener_handle(&self) -> &JoinHandle<()> {
        &self.listener
    }
}
