//! Offline-first synchronization engine for the inkvault card collection
//! and deck builder.
//!
//! The crate owns the in-memory deck replica and collection change ledger,
//! the version-checked catalog cache, the debounced write-back scheduler and
//! the live-update listener. Remote and local persistence are reached through
//! the [`remote::RemoteStore`], [`catalog::CatalogSource`] and
//! [`store::CacheStore`] traits so the whole engine runs against fakes in
//! tests.

pub mod catalog;
pub mod errors;
pub mod models;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;
pub mod views;

pub use errors::{Error, Result};

#[cfg(test)]
pub(crate) mod testing;
