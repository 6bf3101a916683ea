//! Trailing-edge debounce scheduler for write-back and pull-merge work.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

/// Coalescing window applied to persist+push and pull-merge bursts.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Runs an async action once per burst of triggers.
///
/// Each `trigger` re-arms the timer; the action fires only after a full
/// window of inactivity (trailing edge, never queued). Rapid successive
/// edits therefore produce one persist+push instead of one per keystroke.
/// Triggers arriving while the action runs start the next cycle.
#[derive(Clone)]
pub struct Debouncer {
    tx: mpsc::UnboundedSender<()>,
}

impl Debouncer {
    /// Spawn the debounce task around `action`.
    pub fn spawn<F, Fut>(window: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                loop {
                    match timeout(window, rx.recv()).await {
                        // Another trigger inside the window: re-arm.
                        Ok(Some(())) => continue,
                        // All senders dropped; pending work is abandoned.
                        Ok(None) => return,
                        // Window elapsed with no trigger: fire.
                        Err(_) => break,
                    }
                }
                action().await;
            }
        });
        Self { tx }
    }

    /// Request a firing after the inactivity window. Resets any armed timer.
    pub fn trigger(&self) {
        // Send only fails when the task is gone, which means shutdown.
        let _ = self.tx.send(());
    }
}
