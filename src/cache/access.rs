//! Cache Access Module
//!
//! Namespaced value CRUD and TTL operations on top of a [`KeyValueClient`],
//! fronted by an in-process memo table.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::cache::memo::{Load, Memoized};
use crate::cache::{CacheEntry, CACHE_KEY_PREFIX};
use crate::error::{CacheError, Result};
use crate::store::{KeyValueClient, TTL_PERSISTENT};

fn memo_key(key: &str) -> String {
    key.to_string()
}

fn namespaced(key: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, key)
}

/// Reads `redis_key`, marking values that carry an expiry as not memoizable.
async fn load_value(store: &dyn KeyValueClient, redis_key: &str) -> Result<Load<Value>> {
    let Some(value) = store.get(redis_key).await? else {
        return Ok(Load::Missing);
    };
    if store.pttl(redis_key).await? == TTL_PERSISTENT {
        Ok(Load::Keep(value))
    } else {
        Ok(Load::Pass(value))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be blank".to_string()));
    }
    Ok(())
}

// == Cache Access ==
/// The gateway's view of the store: every key is stored under
/// [`CACHE_KEY_PREFIX`], so listing and clearing never touch foreign keys.
///
/// Mutations go to the store first and then to the memo table (write-through).
/// Values with an expiry are never memoized, so the memo cannot outlive the
/// store's own eviction.
pub struct CacheAccess {
    store: Arc<dyn KeyValueClient>,
    memo: Memoized<str, Value>,
}

impl CacheAccess {
    // == Constructor ==
    /// Creates a cache access layer with a memo table of `memo_capacity` entries.
    pub fn new(store: Arc<dyn KeyValueClient>, memo_capacity: u64) -> Self {
        Self {
            store,
            memo: Memoized::new("cache", memo_capacity, memo_key),
        }
    }

    // == Get ==
    /// Returns the value stored at `key`, or `None` when absent.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        info!("Retrieving value for key: {}", key);
        let redis_key = namespaced(key);
        let loaded: Result<Option<Value>> = self
            .memo
            .get_or_load(key, || load_value(self.store.as_ref(), &redis_key))
            .await;
        let value = loaded?;

        debug!("Retrieved value: {:?} for key: {}", value, key);
        Ok(value)
    }

    // == Put ==
    /// Stores `entry`, overwriting any value (and expiry) already at its key.
    pub async fn put(&self, entry: CacheEntry) -> Result<CacheEntry> {
        validate_key(&entry.key)?;
        info!("Storing value for key: {}", entry.key);

        self.store.set(&namespaced(&entry.key), &entry.value).await?;
        self.memo.put(&entry.key, entry.value.clone()).await;

        debug!("Stored value: {} for key: {}", entry.value, entry.key);
        Ok(entry)
    }

    // == Put With TTL ==
    /// Stores `value` at `key`; the store evicts it once `ttl` has elapsed.
    pub async fn put_with_ttl(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        validate_key(key)?;
        if ttl.is_zero() {
            return Err(CacheError::InvalidRequest(
                "TTL must be greater than zero".to_string(),
            ));
        }
        info!("Storing value with TTL for key: {}, timeout: {:?}", key, ttl);

        self.store
            .set_with_ttl(&namespaced(key), &value, ttl)
            .await?;
        self.memo.evict(key).await;
        Ok(())
    }

    // == Update ==
    /// Replaces the value at an existing `key` and returns the new value.
    ///
    /// Fails with [`CacheError::NotFound`] when the key is absent.
    pub async fn update(&self, key: &str, value: Value) -> Result<Value> {
        info!("Updating value for key: {}", key);
        if !self.exists(key).await? {
            return Err(CacheError::NotFound(key.to_string()));
        }

        self.store.set(&namespaced(key), &value).await?;
        self.memo.put(key, value.clone()).await;

        debug!("Updated value: {} for key: {}", value, key);
        Ok(value)
    }

    // == Update Entry ==
    /// Like [`CacheAccess::update`], applied to an entry the caller holds.
    ///
    /// `created_at` is kept; `updated_at` is refreshed.
    pub async fn update_entry(&self, entry: &mut CacheEntry, value: Value) -> Result<()> {
        let stored = self.update(&entry.key, value).await?;
        entry.set_value(stored);
        Ok(())
    }

    // == Exists ==
    /// Returns whether `key` currently holds a value.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.store.exists(&namespaced(key)).await
    }

    // == Delete ==
    /// Removes `key`; returns whether a value was actually removed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        info!("Deleting value for key: {}", key);
        let deleted = self.store.delete(&namespaced(key)).await?;
        self.memo.evict(key).await;

        debug!("Deleted key: {}, result: {}", key, deleted);
        Ok(deleted)
    }

    // == List Keys ==
    /// Returns every key in the namespace, prefix stripped.
    pub async fn list_keys(&self) -> Result<HashSet<String>> {
        let pattern = format!("{}*", CACHE_KEY_PREFIX);
        let keys = self.store.keys(&pattern).await?;

        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(CACHE_KEY_PREFIX).map(str::to_string))
            .collect())
    }

    // == Clear All ==
    /// Removes every key in the namespace; returns how many were removed.
    pub async fn clear_all(&self) -> Result<u64> {
        info!("Clearing all cache entries");
        let pattern = format!("{}*", CACHE_KEY_PREFIX);
        let keys = self.store.keys(&pattern).await?;

        let removed = if keys.is_empty() {
            0
        } else {
            self.store.delete_many(&keys).await?
        };
        self.memo.evict_all();

        info!("Cleared {} cache entries", removed);
        Ok(removed)
    }

    // == TTL Remaining ==
    /// Remaining lifetime of `key` in milliseconds.
    ///
    /// Returns `-1` when the key exists without expiry and `-2` when it does not exist.
    pub async fn ttl_remaining(&self, key: &str) -> Result<i64> {
        self.store.pttl(&namespaced(key)).await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, TTL_MISSING};
    use serde_json::json;

    fn setup() -> (MemoryStore, CacheAccess) {
        let store = MemoryStore::new();
        let access = CacheAccess::new(Arc::new(store.clone()), 100);
        (store, access)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, access) = setup();

        let entry = access
            .put(CacheEntry::new("user:1", json!({"name": "Ada"})))
            .await
            .unwrap();
        assert_eq!(entry.key, "user:1");

        assert_eq!(
            access.get("user:1").await.unwrap(),
            Some(json!({"name": "Ada"}))
        );
        // Stored under the namespace prefix
        assert!(store.exists("cache:user:1").await.unwrap());
        assert!(!store.exists("user:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_absent() {
        let (_, access) = setup();
        assert_eq!(access.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_blank_key_rejected() {
        let (store, access) = setup();

        let result = access.put(CacheEntry::new("  ", json!(1))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_, access) = setup();

        access.put(CacheEntry::new("k", json!(1))).await.unwrap();
        access.put(CacheEntry::new("k", json!(2))).await.unwrap();

        assert_eq!(access.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_update_absent_key_fails() {
        let (_, access) = setup();

        let result = access.update("missing", json!(1)).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
        assert_eq!(access.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_entry_keeps_created_at() {
        let (_, access) = setup();

        let mut entry = access
            .put(CacheEntry::new("k", json!("old")))
            .await
            .unwrap();
        let created = entry.created_at;
        tokio::time::sleep(Duration::from_millis(5)).await;

        access.update_entry(&mut entry, json!("new")).await.unwrap();

        assert_eq!(entry.created_at, created);
        assert!(entry.updated_at > created);
        assert_eq!(access.get("k").await.unwrap(), Some(json!("new")));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_, access) = setup();

        assert!(!access.delete("k").await.unwrap());

        access.put(CacheEntry::new("k", json!(1))).await.unwrap();
        assert!(access.delete("k").await.unwrap());
        assert_eq!(access.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_sentinels() {
        let (_, access) = setup();

        access.put(CacheEntry::new("plain", json!(1))).await.unwrap();
        access
            .put_with_ttl("timed", json!(1), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(access.ttl_remaining("plain").await.unwrap(), -1);
        assert_eq!(access.ttl_remaining("absent").await.unwrap(), TTL_MISSING);
        let remaining = access.ttl_remaining("timed").await.unwrap();
        assert!(remaining > 0 && remaining <= 30_000);
    }

    #[tokio::test]
    async fn test_expiring_value_not_served_after_eviction() {
        let (_, access) = setup();

        access
            .put_with_ttl("session", json!("data"), Duration::from_millis(60))
            .await
            .unwrap();
        assert_eq!(access.get("session").await.unwrap(), Some(json!("data")));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(access.get("session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_with_ttl_replaces_memoized_value() {
        let (_, access) = setup();

        access.put(CacheEntry::new("k", json!("forever"))).await.unwrap();
        assert_eq!(access.get("k").await.unwrap(), Some(json!("forever")));

        access
            .put_with_ttl("k", json!("brief"), Duration::from_millis(60))
            .await
            .unwrap();
        assert_eq!(access.get("k").await.unwrap(), Some(json!("brief")));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(access.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let (_, access) = setup();
        let result = access.put_with_ttl("k", json!(1), Duration::ZERO).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_list_keys_strips_prefix() {
        let (store, access) = setup();

        access.put(CacheEntry::new("a", json!(1))).await.unwrap();
        access.put(CacheEntry::new("b:c", json!(2))).await.unwrap();
        store.set("foreign:key", &json!(3)).await.unwrap();

        let keys = access.list_keys().await.unwrap();
        assert_eq!(keys, HashSet::from(["a".to_string(), "b:c".to_string()]));
    }

    #[tokio::test]
    async fn test_clear_all_leaves_foreign_keys() {
        let (store, access) = setup();

        access.put(CacheEntry::new("a", json!(1))).await.unwrap();
        access.put(CacheEntry::new("b", json!(2))).await.unwrap();
        store.set("foreign:key", &json!(3)).await.unwrap();

        assert_eq!(access.clear_all().await.unwrap(), 2);
        assert!(access.list_keys().await.unwrap().is_empty());
        assert_eq!(access.get("a").await.unwrap(), None);
        assert!(store.exists("foreign:key").await.unwrap());

        // No-op when already empty
        assert_eq!(access.clear_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_unavailable() {
        let (store, access) = setup();
        store.set_offline(true);

        assert!(matches!(
            access.get("k").await,
            Err(CacheError::StoreUnavailable(_))
        ));
        assert!(matches!(
            access.put(CacheEntry::new("k", json!(1))).await,
            Err(CacheError::StoreUnavailable(_))
        ));
    }

    /// Store whose TTL lookup lags, widening the window between a read's
    /// `get` and its memo insert.
    struct LaggingTtlStore {
        inner: MemoryStore,
        lag: Duration,
    }

    #[async_trait::async_trait]
    impl KeyValueClient for LaggingTtlStore {
        async fn ping(&self) -> Result<String> {
            self.inner.ping().await
        }
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &Value) -> Result<()> {
            self.inner.set(key, value).await
        }
        async fn set_with_ttl(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
            self.inner.set_with_ttl(key, value, ttl).await
        }
        async fn delete(&self, key: &str) -> Result<bool> {
            self.inner.delete(key).await
        }
        async fn delete_many(&self, keys: &[String]) -> Result<u64> {
            self.inner.delete_many(keys).await
        }
        async fn exists(&self, key: &str) -> Result<bool> {
            self.inner.exists(key).await
        }
        async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
            self.inner.keys(pattern).await
        }
        async fn pttl(&self, key: &str) -> Result<i64> {
            tokio::time::sleep(self.lag).await;
            self.inner.pttl(key).await
        }
    }

    #[tokio::test]
    async fn test_put_during_slow_read_is_not_overwritten() {
        let store = MemoryStore::new();
        let access = CacheAccess::new(
            Arc::new(LaggingTtlStore {
                inner: store.clone(),
                lag: Duration::from_millis(50),
            }),
            100,
        );
        store.set("cache:k", &json!("v1")).await.unwrap();

        let (read, written) = tokio::join!(access.get("k"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            access.put(CacheEntry::new("k", json!("v2"))).await
        });
        assert_eq!(read.unwrap(), Some(json!("v1")));
        written.unwrap();

        assert_eq!(store.get("cache:k").await.unwrap(), Some(json!("v2")));
        assert_eq!(access.get("k").await.unwrap(), Some(json!("v2")));
    }

    #[tokio::test]
    async fn test_delete_during_slow_read_is_not_resurrected() {
        let store = MemoryStore::new();
        let access = CacheAccess::new(
            Arc::new(LaggingTtlStore {
                inner: store.clone(),
                lag: Duration::from_millis(50),
            }),
            100,
        );
        store.set("cache:k", &json!("v1")).await.unwrap();

        let (read, deleted) = tokio::join!(access.get("k"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            access.delete("k").await
        });
        assert_eq!(read.unwrap(), Some(json!("v1")));
        assert!(deleted.unwrap());

        assert_eq!(access.get("k").await.unwrap(), None);
    }
}
