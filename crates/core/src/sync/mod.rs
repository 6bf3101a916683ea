//! User-data synchronization: deck replica, collection ledger, write-back
//! scheduling and live-update listening.

mod decks;
mod ledger;
mod listener;
mod scheduler;

pub use decks::{merge_decks, partition_push, DeckReplica};
pub use ledger::{merge_entries, ChangeLedger};
pub use listener::spawn_listener;
pub use scheduler::{Debouncer, DEFAULT_DEBOUNCE_WINDOW};
