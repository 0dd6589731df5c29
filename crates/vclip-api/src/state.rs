//! Application state.

use vclip_queue::Registry;
use vclip_storage::RemoteStorage;

use crate::config::ApiConfig;

/// Shared application state. `Registry` and `RemoteStorage` are themselves
/// internally `Arc`-backed, so cloning `AppState` per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: RemoteStorage,
    pub registry: Registry,
}

impl AppState {
    pub fn new(config: ApiConfig, storage: RemoteStorage, registry: Registry) -> Self {
        Self {
            config,
            storage,
            registry,
        }
    }
}
