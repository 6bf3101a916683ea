//! HTTP client for the sync backend's REST tables and function endpoints.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use inkvault_core::catalog::{ApiCatalog, CatalogMetadata, CatalogSource};
use inkvault_core::models::{ChangeNotification, CollectionChange, Deck};
use inkvault_core::remote::RemoteStore;
use inkvault_core::Result as CoreResult;

use crate::error::{RemoteError, Result};
use crate::feed;
use crate::types::ApiErrorResponse;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the sync backend.
///
/// One instance serves the catalog function endpoints, the `decks` and
/// `collection` REST tables and the change-notification feed.
#[derive(Debug, Clone)]
pub struct SyncApiClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl SyncApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the backend (e.g., "https://api.inkvault.app")
    /// * `api_key` - The anonymous API key sent with every request
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key_value = HeaderValue::from_str(api_key)
            .map_err(|_| RemoteError::config("Invalid API key format"))?;
        headers.insert("apikey", key_value);
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| RemoteError::config("Invalid API key format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request_headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    /// Subscribe to the change-notification feed.
    ///
    /// Spawns a background task that keeps the streaming request open and
    /// forwards notifications into the returned channel. A dropped transport
    /// is logged and reconnected with backoff; the subscription lasts until
    /// the receiver is dropped.
    pub fn subscribe_changes(&self, buffer: usize) -> tokio::sync::mpsc::Receiver<ChangeNotification> {
        feed::spawn(self.clone(), buffer)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Parse a JSON response body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            RemoteError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Check a response for success, discarding any body.
    async fn expect_success(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            debug!("API response status: {}", status);
            return Ok(());
        }
        let body = response.text().await?;
        Self::log_response(status, &body);
        Err(Self::api_error(status.as_u16(), &body))
    }

    fn api_error(status: u16, body: &str) -> RemoteError {
        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(body) {
            return RemoteError::api(status, format!("{}: {}", error.code, error.message));
        }
        RemoteError::api(status, format!("Request failed: {}", body))
    }

    /// Invoke a backend function endpoint.
    ///
    /// POST /functions/v1/{name}
    pub async fn invoke_function<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let url = format!("{}/functions/v1/{}", self.base_url, name);
        debug!("Invoking function: {}", name);

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Select all rows of a table.
    ///
    /// GET /rest/v1/{table}?select=*
    pub async fn select<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let url = format!("{}/rest/v1/{}?select=*", self.base_url, table);

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Insert a batch of rows.
    ///
    /// POST /rest/v1/{table}
    pub async fn insert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        debug!("Inserting {} rows into {}", rows.len(), table);

        let mut headers = self.headers.clone();
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&rows)
            .send()
            .await?;

        Self::expect_success(response).await
    }

    /// Update one row by id.
    ///
    /// PATCH /rest/v1/{table}?id=eq.{id}
    pub async fn update_by_id<T: Serialize>(&self, table: &str, id: &str, row: &T) -> Result<()> {
        let url = format!("{}/rest/v1/{}?id=eq.{}", self.base_url, table, id);

        let mut headers = self.headers.clone();
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let response = self
            .client
            .patch(&url)
            .headers(headers)
            .json(row)
            .send()
            .await?;

        Self::expect_success(response).await
    }
}

#[async_trait]
impl RemoteStore for SyncApiClient {
    async fn select_decks(&self) -> CoreResult<Vec<Deck>> {
        Ok(self.select("decks").await?)
    }

    async fn insert_decks(&self, decks: &[Deck]) -> CoreResult<()> {
        Ok(self.insert("decks", decks).await?)
    }

    async fn update_deck(&self, deck: &Deck) -> CoreResult<()> {
        Ok(self.update_by_id("decks", &deck.id, deck).await?)
    }

    async fn select_changes(&self) -> CoreResult<Vec<CollectionChange>> {
        Ok(self.select("collection").await?)
    }

    async fn insert_changes(&self, changes: &[CollectionChange]) -> CoreResult<()> {
        Ok(self.insert("collection", changes).await?)
    }
}

#[async_trait]
impl CatalogSource for SyncApiClient {
    async fn fetch_metadata(&self) -> CoreResult<CatalogMetadata> {
        Ok(self.invoke_function("catalog-metadata").await?)
    }

    async fn fetch_catalog(&self) -> CoreResult<ApiCatalog> {
        Ok(self.invoke_function("catalog-cards").await?)
    }
}
