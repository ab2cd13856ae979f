//! Shared application state for the API server.
//!
//! [`AppState`] holds the [`GridStore`] that every handler works against.
//! It is wrapped in an [`Arc`](std::sync::Arc) and injected via Axum's
//! `State` extractor; the store does its own locking, so handlers never
//! hold anything across awaits beyond the store's internal lock.

use trophic_core::config::SimulationConfig;
use trophic_core::store::GridStore;

/// Shared state for the Axum application.
pub struct AppState {
    /// The authoritative grid store.
    pub store: GridStore,
}

impl AppState {
    /// Build application state from deploy-time configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            store: GridStore::new(config),
        }
    }
}
