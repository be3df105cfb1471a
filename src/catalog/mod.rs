//! Catalog Module
//!
//! A slow lookup fronted by the memo helper: the first read of an id pays the
//! full load delay, later reads are served from memory until evicted.

use std::convert::Infallible;
use std::time::Duration;

use tracing::info;

use crate::cache::{Load, Memoized};
use crate::store::current_timestamp_ms;

/// Memo slot for a catalog id.
fn catalog_key(id: &str) -> String {
    id.to_string()
}

// == Catalog Service ==
/// Catalog lookups memoized per id.
///
/// Reads go through the memo table; `update_cache` writes through it and the
/// evict operations drop entries so the next read loads again.
pub struct CatalogService {
    memo: Memoized<str, String>,
    load_delay: Duration,
}

impl CatalogService {
    // == Constructor ==
    /// Creates a service holding at most `capacity` ids, each first load
    /// taking `load_delay`.
    pub fn new(capacity: u64, load_delay: Duration) -> Self {
        Self {
            memo: Memoized::new("cache_collection_attribute", capacity, catalog_key),
            load_delay,
        }
    }

    // == Read ==
    /// Returns the data for `id`, computing it on first use.
    pub async fn get_cached_data(&self, id: &str) -> String {
        let loaded: Result<Option<String>, Infallible> = self
            .memo
            .get_or_load(id, || self.load(id))
            .await;
        match loaded {
            Ok(data) => data.unwrap_or_default(),
            Err(never) => match never {},
        }
    }

    // == Write / Evict ==
    /// Replaces the memoized data for `id` and returns it.
    pub async fn update_cache(&self, id: &str, data: String) -> String {
        info!("Updating cache for id: {} with data: {}", id, data);
        self.memo.put(id, data.clone()).await;
        data
    }

    /// Forgets the data for `id`.
    pub async fn evict(&self, id: &str) {
        info!("Evicting cache for id: {}", id);
        self.memo.evict(id).await;
    }

    /// Forgets every id.
    pub fn evict_all(&self) {
        info!("Evicting all cache entries");
        self.memo.evict_all();
    }

    /// The slow lookup: waits `load_delay`, then stamps the id with the current time.
    async fn load(&self, id: &str) -> Result<Load<String>, Infallible> {
        info!("Fetching data from expensive operation for id: {}", id);
        tokio::time::sleep(self.load_delay).await;
        Ok(Load::Keep(format!(
            "Expensive data for {} at {}",
            id,
            current_timestamp_ms()
        )))
    }
}
