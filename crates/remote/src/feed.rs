//! Streamed change-notification feed.
//!
//! The backend exposes change notifications as newline-delimited JSON over a
//! long-lived HTTP response. Each line is one [`ChangeNotification`]; blank
//! lines are keep-alives. The subscription lasts for the whole session: a
//! dropped transport is reconnected with backoff.

use std::time::Duration;

use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::mpsc;

use inkvault_core::models::ChangeNotification;

use crate::client::SyncApiClient;
use crate::error::{RemoteError, Result};

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_millis(500);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

enum FeedExit {
    ReceiverClosed,
    StreamEnded,
}

/// Spawn the feed reader and return the notification channel.
///
/// The reader reconnects whenever the transport drops, doubling its delay up
/// to a cap and resetting it after a successful connection. The task ends
/// only when the receiver is dropped.
pub(crate) fn spawn(client: SyncApiClient, buffer: usize) -> mpsc::Receiver<ChangeNotification> {
    let (tx, rx) = mpsc::channel(buffer);
    tokio::spawn(async move {
        // A dedicated client: the shared one carries a request timeout that
        // would cut the long-lived stream short.
        let http = match reqwest::Client::builder().build() {
            Ok(http) => http,
            Err(e) => {
                warn!("Change feed client construction failed: {}", e);
                return;
            }
        };

        let mut delay = INITIAL_RECONNECT_DELAY;
        loop {
            match run(&http, &client, &tx).await {
                Ok(FeedExit::ReceiverClosed) => return,
                Ok(FeedExit::StreamEnded) => {
                    debug!("Change feed stream ended, reconnecting");
                    delay = INITIAL_RECONNECT_DELAY;
                }
                Err(e) => warn!("Change feed dropped: {}", e),
            }
            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_RECONNECT_DELAY);
        }
    });
    rx
}

async fn run(
    http: &reqwest::Client,
    client: &SyncApiClient,
    tx: &mpsc::Sender<ChangeNotification>,
) -> Result<FeedExit> {
    let url = format!("{}/realtime/v1/stream", client.base_url());

    let response = http
        .get(&url)
        .headers(client.request_headers())
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteError::api(
            status.as_u16(),
            format!("Feed subscription rejected: {}", body),
        ));
    }
    debug!("Change feed connected");

    let mut stream = response.bytes_stream();
    let mut pending: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        pending.extend_from_slice(&chunk);

        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            let line = trim_line(&line);
            if line.is_empty() {
                continue;
            }

            match serde_json::from_slice::<ChangeNotification>(line) {
                Ok(notification) => {
                    if tx.send(notification).await.is_err() {
                        return Ok(FeedExit::ReceiverClosed);
                    }
                }
                Err(e) => debug!("Skipping malformed feed line: {}", e),
            }
        }
    }

    Ok(FeedExit::StreamEnded)
}

fn trim_line(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}
