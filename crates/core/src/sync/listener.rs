//! Live-update listener: turns remote change notifications into debounced
//! pull-merges.

use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{ChangeNotification, SyncTable};
use crate::sync::decks::DeckReplica;
use crate::sync::ledger::ChangeLedger;
use crate::sync::scheduler::Debouncer;

/// Spawn the listener task.
///
/// Ledger notifications always trigger a debounced ledger pull. Deck
/// notifications trigger a debounced deck pull unless the notified row was
/// written by this session's own client, which would only re-merge what was
/// just pushed. The task runs until the notification channel closes; there
/// is no explicit teardown.
pub fn spawn_listener(
    mut notifications: mpsc::Receiver<ChangeNotification>,
    decks: DeckReplica,
    ledger: ChangeLedger,
    window: Duration,
) -> JoinHandle<()> {
    let client_id = decks.client_id().clone();

    let deck_pull = {
        let decks = decks.clone();
        Debouncer::spawn(window, move || {
            let decks = decks.clone();
            async move { decks.pull_merge().await }
        })
    };
    let ledger_pull = {
        let ledger = ledger.clone();
        Debouncer::spawn(window, move || {
            let ledger = ledger.clone();
            async move { ledger.pull_merge().await }
        })
    };

    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            match notification.table {
                SyncTable::Collection => ledger_pull.trigger(),
                SyncTable::Decks => {
                    if notification.origin_client_id() == Some(client_id.as_str()) {
                        debug!("ignoring self-originated deck notification");
                    } else {
                        deck_pull.trigger();
                    }
                }
            }
        }
        debug!("change notification channel closed");
    })
}
