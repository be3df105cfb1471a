//! Cache Entry Module
//!
//! The key/value pair a client stores, with creation and update timestamps.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

// == Cache Entry ==
/// A logical cache entry as seen by API clients.
///
/// The authoritative copy of `value` lives in the store under the namespaced
/// key; this struct is request-scoped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cache key identifier (without namespace prefix)
    pub key: String,
    /// The cached value, any JSON document
    pub value: Value,
    /// Set once at construction
    pub created_at: DateTime<Utc>,
    /// Refreshed on every value change
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            value,
            created_at: now,
            updated_at: now,
        }
    }

    // == Set Value ==
    /// Replaces the value and refreshes `updated_at`.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.updated_at = Utc::now();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("user:1", json!("Ada"));

        assert_eq!(entry.key, "user:1");
        assert_eq!(entry.value, json!("Ada"));
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn test_set_value_advances_updated_at() {
        let mut entry = CacheEntry::new("user:1", json!("Ada"));
        let created = entry.created_at;

        sleep(Duration::from_millis(5));
        entry.set_value(json!("Grace"));

        assert_eq!(entry.value, json!("Grace"));
        assert_eq!(entry.created_at, created);
        assert!(entry.updated_at > created);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = CacheEntry::new("k", json!(1));
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["key"], "k");
    }
}
