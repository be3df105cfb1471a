//! Application State
//!
//! Services shared by every handler.

use std::sync::Arc;

use crate::cache::CacheAccess;
use crate::catalog::CatalogService;
use crate::checkpoint::CheckpointTrigger;
use crate::config::Config;
use crate::health::HealthProbe;
use crate::store::KeyValueClient;

/// Application state shared across all handlers.
///
/// Every service is behind an `Arc`; cloning the state is cheap. The store
/// client pools its own connections, so no lock is held here.
#[derive(Clone)]
pub struct AppState {
    /// Namespaced cache operations
    pub cache: Arc<CacheAccess>,
    /// Store health checks
    pub health: Arc<HealthProbe>,
    /// Process snapshot control
    pub checkpoint: Arc<CheckpointTrigger>,
    /// Memoized catalog lookups
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    /// Builds all services over `store` using the given configuration.
    pub fn new(store: Arc<dyn KeyValueClient>, config: &Config) -> Self {
        Self {
            cache: Arc::new(CacheAccess::new(store.clone(), config.memo_capacity)),
            health: Arc::new(HealthProbe::new(store)),
            checkpoint: Arc::new(CheckpointTrigger::from_command(
                config.checkpoint_command.as_deref(),
            )),
            catalog: Arc::new(CatalogService::new(
                config.memo_capacity,
                config.catalog_load_delay(),
            )),
        }
    }

    /// Builds all services over `store` with default configuration.
    pub fn with_store(store: impl KeyValueClient + 'static) -> Self {
        Self::new(Arc::new(store), &Config::default())
    }

    /// Replaces the checkpoint trigger.
    pub fn with_checkpoint(mut self, checkpoint: CheckpointTrigger) -> Self {
        self.checkpoint = Arc::new(checkpoint);
        self
    }
}
