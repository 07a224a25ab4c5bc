//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::StoreBackend;
use crate::service::SecretService;
use crate::store::MemoryStore;

/// Application state shared across all request handlers.
///
/// Cheaply cloneable so that Axum can clone it per request: the service is
/// `Arc`-wrapped and the backend tag is `Copy`.
#[derive(Clone)]
pub struct AppState {
    /// The secret service over whichever store was selected at startup.
    pub service: Arc<SecretService>,
    /// Which backend is active, reported by the health endpoint.
    pub backend: StoreBackend,
}

impl AppState {
    /// Create a new [`AppState`] wrapping the given service.
    pub fn new(service: SecretService, backend: StoreBackend) -> Self {
        Self {
            service: Arc::new(service),
            backend,
        }
    }
}

impl Default for AppState {
    /// Memory-backed state, suitable for tests.
    fn default() -> Self {
        let store = Arc::new(MemoryStore::new("test"));
        Self::new(SecretService::new(store), StoreBackend::Memory)
    }
}
