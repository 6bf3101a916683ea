//! Remote store client for the inkvault sync backend.
//!
//! Implements the core crate's [`inkvault_core::remote::RemoteStore`] and
//! [`inkvault_core::catalog::CatalogSource`] traits over the backend's REST
//! tables and function endpoints, plus the streamed change-notification
//! feed consumed by the live-update listener.

mod client;
mod error;
mod feed;
mod types;

#[cfg(test)]
mod testing;

pub use client::SyncApiClient;
pub use error::{RemoteError, Result};
pub use types::ApiErrorResponse;
