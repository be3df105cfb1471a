//! Memory Store Module
//!
//! In-process [`KeyValueClient`] with Redis-compatible TTL semantics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    glob_match, ttl_millis, KeyValueClient, StoredValue, PING_REPLY, TTL_MISSING, TTL_PERSISTENT,
};
use crate::error::{CacheError, Result};

// == Memory Store ==
/// HashMap-backed store with per-key expiry.
///
/// Expired values are dropped lazily on access and in bulk by
/// [`MemoryStore::cleanup_expired`], which the background sweep calls.
/// Cloning is cheap and every clone shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Fault Injection ==
    /// Makes every subsequent call fail as if the store were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::StoreUnavailable(
                "Connection refused (memory store offline)".to_string(),
            ));
        }
        Ok(())
    }

    // == Cleanup Expired ==
    /// Removes all expired values.
    ///
    /// Returns the number of values removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| !stored.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of live values.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|stored| !stored.is_expired()).count()
    }

    // == Is Empty ==
    /// Returns true if no live values remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn insert(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        self.check_online()?;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), StoredValue::new(value.clone(), ttl));
        Ok(())
    }
}

#[async_trait]
impl KeyValueClient for MemoryStore {
    async fn ping(&self) -> Result<String> {
        self.check_online()?;
        Ok(PING_REPLY.to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.check_online()?;
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(stored) if stored.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.insert(key, value, None).await
    }

    async fn set_with_ttl(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidRequest(
                "TTL must be greater than zero".to_string(),
            ));
        }
        ttl_millis(ttl)?;
        self.insert(key, value, Some(ttl)).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check_online()?;
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .map(|stored| !stored.is_expired())
            .unwrap_or(false))
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64> {
        self.check_online()?;
        let mut entries = self.entries.write().await;
        let removed = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|stored| !stored.is_expired())
            .count();
        Ok(removed as u64)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check_online()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .map(|stored| !stored.is_expired())
            .unwrap_or(false))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.check_online()?;
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(key, stored)| !stored.is_expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn pttl(&self, key: &str) -> Result<i64> {
        self.check_online()?;
        let entries = self.entries.read().await;
        let ttl = match entries.get(key) {
            None => TTL_MISSING,
            Some(stored) if stored.is_expired() => TTL_MISSING,
            Some(stored) => match stored.ttl_remaining_ms() {
                Some(remaining) => i64::try_from(remaining).unwrap_or(i64::MAX),
                None => TTL_PERSISTENT,
            },
        };
        Ok(ttl)
    }
}
