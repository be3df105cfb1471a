//! Store Module
//!
//! Client-side view of the key-value store the gateway fronts.
//!
//! [`KeyValueClient`] is the seam between the gateway and the store. Two
//! implementations are provided:
//! - [`RedisClient`] - network client backed by a Redis connection manager
//! - [`MemoryStore`] - in-process store with the same TTL semantics

mod entry;
mod memory;
mod redis_client;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CacheError, Result};

pub use entry::{current_timestamp_ms, StoredValue};
pub use memory::MemoryStore;
pub use redis_client::RedisClient;

// == Public Constants ==
/// Reply the store gives to a healthy `PING`.
pub const PING_REPLY: &str = "PONG";

/// `pttl` result for a key that exists but has no expiry.
pub const TTL_PERSISTENT: i64 = -1;

/// `pttl` result for a key that does not exist.
pub const TTL_MISSING: i64 = -2;

/// Longest accepted TTL in milliseconds.
///
/// Half of `i64::MAX`, so the expiry timestamp (now + ttl) and the `pttl`
/// reading both stay within a signed 64-bit millisecond count.
pub const MAX_TTL_MS: u64 = (i64::MAX / 2) as u64;

/// Converts `ttl` to whole milliseconds, rejecting anything above [`MAX_TTL_MS`].
pub fn ttl_millis(ttl: Duration) -> Result<u64> {
    u64::try_from(ttl.as_millis())
        .ok()
        .filter(|millis| *millis <= MAX_TTL_MS)
        .ok_or_else(|| {
            CacheError::InvalidRequest(format!(
                "TTL must not exceed {} milliseconds",
                MAX_TTL_MS
            ))
        })
}

/// Operations the gateway needs from a key-value store.
///
/// Keys are raw store keys; namespacing is the caller's concern.
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Liveness check; a healthy store answers [`PING_REPLY`].
    async fn ping(&self) -> Result<String>;

    /// Returns the value at `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` at `key` with no expiry, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: &Value) -> Result<()>;

    /// Stores `value` at `key`, evicted by the store after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &Value, ttl: Duration) -> Result<()>;

    /// Removes `key`; returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Removes every key in `keys`; returns how many existed.
    async fn delete_many(&self, keys: &[String]) -> Result<u64>;

    /// Returns whether `key` exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Returns every key matching the glob `pattern`.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Remaining lifetime of `key` in milliseconds, or [`TTL_PERSISTENT`] /
    /// [`TTL_MISSING`].
    async fn pttl(&self, key: &str) -> Result<i64>;
}

/// Matches `text` against a store glob pattern (`*` any run, `?` one char).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            // backtrack: let the last star swallow one more char
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_bounds() {
        assert_eq!(ttl_millis(Duration::from_millis(1500)).unwrap(), 1500);
        assert_eq!(
            ttl_millis(Duration::from_millis(MAX_TTL_MS)).unwrap(),
            MAX_TTL_MS
        );
        assert!(matches!(
            ttl_millis(Duration::from_millis(MAX_TTL_MS + 1)),
            Err(CacheError::InvalidRequest(_))
        ));
        assert!(ttl_millis(Duration::MAX).is_err());
    }

    #[test]
    fn test_glob_prefix() {
        assert!(glob_match("cache:*", "cache:user:1"));
        assert!(glob_match("cache:*", "cache:"));
        assert!(!glob_match("cache:*", "health:check:1"));
    }

    #[test]
    fn test_glob_star_matches_everything() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
    }

    #[test]
    fn test_glob_inner_wildcards() {
        assert!(glob_match("a*c", "abbbc"));
        assert!(glob_match("a?c", "abc"));
        assert!(!glob_match("a?c", "abbc"));
        assert!(glob_match("*:check:*", "health:check:123"));
    }

    #[test]
    fn test_glob_exact() {
        assert!(glob_match("key", "key"));
        assert!(!glob_match("key", "keys"));
    }
}
