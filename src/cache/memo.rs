//! Memoization Module
//!
//! Explicit read-through memoization with write-through updates and
//! invalidation, applied at call sites instead of declared on functions.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::future::Cache;
use tracing::debug;

/// What a loader produced for a memo miss.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<V> {
    /// Value found; remember it.
    Keep(V),
    /// Value found but must not be remembered (e.g. it expires on its own).
    Pass(V),
    /// Nothing found; nothing is remembered.
    Missing,
}

// == Memoized ==
/// A named, bounded memo table in front of some slower source.
///
/// Entries are addressed by a key derived from the call argument with
/// `derive_key`, so every operation on the same argument hits the same slot.
/// A capacity of zero disables the table: every read goes to the loader.
///
/// Every write or eviction bumps a generation counter. A loaded value is only
/// remembered when no write happened while it was being loaded, so a slow
/// read never overwrites a newer value.
pub struct Memoized<A: ?Sized, V> {
    name: &'static str,
    derive_key: fn(&A) -> String,
    cache: Option<Cache<String, V>>,
    generation: AtomicU64,
}

impl<A, V> Memoized<A, V>
where
    A: ?Sized,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a memo table holding at most `capacity` entries.
    pub fn new(name: &'static str, capacity: u64, derive_key: fn(&A) -> String) -> Self {
        let cache = (capacity > 0).then(|| Cache::builder().name(name).max_capacity(capacity).build());
        Self {
            name,
            derive_key,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the memoized value for `arg`, calling `load` on a miss.
    pub async fn get_or_load<F, Fut, E>(&self, arg: &A, load: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Load<V>, E>>,
    {
        let key = (self.derive_key)(arg);
        if let Some(cache) = &self.cache {
            if let Some(value) = cache.get(&key).await {
                debug!("memo '{}' hit for {}", self.name, key);
                return Ok(Some(value));
            }
        }

        debug!("memo '{}' miss for {}", self.name, key);
        let started = self.generation.load(Ordering::SeqCst);
        match load().await? {
            Load::Keep(value) => {
                if let Some(cache) = &self.cache {
                    self.remember(cache, key, value.clone(), started).await;
                }
                Ok(Some(value))
            }
            Load::Pass(value) => Ok(Some(value)),
            Load::Missing => Ok(None),
        }
    }

    /// Inserts a loaded value unless a write raced with the load.
    ///
    /// The generation is checked again after the insert: a write that bumped
    /// it in between may have inserted before us, so our entry is dropped.
    async fn remember(&self, cache: &Cache<String, V>, key: String, value: V, started: u64) {
        if self.generation.load(Ordering::SeqCst) != started {
            debug!("memo '{}' skipped stale load for {}", self.name, key);
            return;
        }
        cache.insert(key.clone(), value).await;
        if self.generation.load(Ordering::SeqCst) != started {
            cache.invalidate(&key).await;
        }
    }

    /// Returns the memoized value for `arg` without loading.
    pub async fn peek(&self, arg: &A) -> Option<V> {
        match &self.cache {
            Some(cache) => cache.get(&(self.derive_key)(arg)).await,
            None => None,
        }
    }

    /// Records `value` for `arg`, replacing any previous one.
    pub async fn put(&self, arg: &A, value: V) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.insert((self.derive_key)(arg), value).await;
        }
    }

    /// Forgets the value for `arg`.
    pub async fn evict(&self, arg: &A) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.invalidate(&(self.derive_key)(arg)).await;
        }
    }

    /// Forgets every value.
    pub fn evict_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}

impl<A: ?Sized, V> fmt::Debug for Memoized<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name)
            .field("enabled", &self.cache.is_some())
            .finish()
    }
}
