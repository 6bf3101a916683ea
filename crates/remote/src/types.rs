//! Wire types specific to the remote client.

use serde::Deserialize;

/// Structured error body returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}
