//! Response DTOs for the cache gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::checkpoint::CheckpointOutcome;
use crate::health::HealthStatus;
use crate::store::{TTL_MISSING, TTL_PERSISTENT};

/// Response body for GET /api/cache/{key}
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
    pub exists: bool,
}

impl GetResponse {
    pub fn found(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            exists: true,
        }
    }
}

/// Response body for POST /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    pub key: String,
    pub value: Value,
    pub created: bool,
    /// When the entry was created
    pub timestamp: DateTime<Utc>,
}

/// Response body for POST /api/cache/ttl
#[derive(Debug, Clone, Serialize)]
pub struct TtlResponse {
    pub key: String,
    pub value: String,
    pub ttl: u64,
    pub unit: String,
    pub created: bool,
}

/// Response body for PUT /api/cache/{key}
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub key: String,
    pub value: Value,
    pub updated: bool,
}

/// Response body for DELETE /api/cache/{key}
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    pub deleted: bool,
}

/// Response body for GET /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
    pub count: usize,
}

impl KeysResponse {
    /// Builds a response with keys in sorted order.
    pub fn new(keys: HashSet<String>) -> Self {
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort();
        Self {
            count: keys.len(),
            keys,
        }
    }
}

/// Response body for DELETE /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            cleared: true,
            message: "All cache entries cleared".to_string(),
        }
    }
}

/// Response body for GET /api/cache/{key}/expiration
#[derive(Debug, Clone, Serialize)]
pub struct ExpirationResponse {
    pub key: String,
    /// Remaining seconds, or -1 (no expiry) / -2 (no such key)
    pub expiration: i64,
    pub unit: &'static str,
}

impl ExpirationResponse {
    /// Builds the response from a millisecond TTL reading.
    ///
    /// Positive readings are rounded up to whole seconds so a live key never
    /// reports zero; the -1 and -2 sentinels pass through unchanged.
    pub fn from_millis(key: impl Into<String>, ttl_ms: i64) -> Self {
        let expiration = match ttl_ms {
            TTL_PERSISTENT | TTL_MISSING => ttl_ms,
            ms if ms > 0 => (ms + 999) / 1000,
            _ => 0,
        };
        Self {
            key: key.into(),
            expiration,
            unit: "seconds",
        }
    }
}

/// Response body for GET /health/redis/simple
#[derive(Debug, Clone, Serialize)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
    pub healthy: bool,
}

impl SimpleHealthResponse {
    pub fn new(healthy: bool) -> Self {
        Self {
            status: if healthy {
                HealthStatus::Up
            } else {
                HealthStatus::Down
            },
            healthy,
        }
    }
}

/// Response body for POST /admin/checkpoint
#[derive(Debug, Clone, Serialize)]
pub struct CheckpointResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<&'static str>,
}

impl From<&CheckpointOutcome> for CheckpointResponse {
    fn from(outcome: &CheckpointOutcome) -> Self {
        match outcome {
            CheckpointOutcome::Failed(message) => Self {
                status: "FAILED",
                error: Some(format!("Checkpoint failed: {}", message)),
                message: None,
                exception: Some("CheckpointException"),
            },
            CheckpointOutcome::Unsupported(message) => Self {
                status: "UNSUPPORTED",
                error: Some("Checkpoint not supported in current environment".to_string()),
                message: Some(message.clone()),
                exception: None,
            },
            CheckpointOutcome::UnexpectedReturn => Self {
                status: "UNEXPECTED_RETURN",
                error: None,
                message: Some("Checkpoint returned unexpectedly".to_string()),
                exception: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::found("test", json!("data"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"key": "test", "value": "data", "exists": true}));
    }

    #[test]
    fn test_keys_response_sorted_with_count() {
        let keys = HashSet::from(["b".to_string(), "a".to_string()]);
        let resp = KeysResponse::new(keys);
        assert_eq!(resp.keys, vec!["a", "b"]);
        assert_eq!(resp.count, 2);
    }

    #[test]
    fn test_expiration_conversion() {
        assert_eq!(ExpirationResponse::from_millis("k", -1).expiration, -1);
        assert_eq!(ExpirationResponse::from_millis("k", -2).expiration, -2);
        assert_eq!(ExpirationResponse::from_millis("k", 299_001).expiration, 300);
        assert_eq!(ExpirationResponse::from_millis("k", 1).expiration, 1);
        assert_eq!(ExpirationResponse::from_millis("k", 5_000).expiration, 5);
        assert_eq!(ExpirationResponse::from_millis("k", 5_000).unit, "seconds");
    }

    #[test]
    fn test_simple_health_serialize() {
        let json = serde_json::to_value(SimpleHealthResponse::new(false)).unwrap();
        assert_eq!(json, json!({"status": "DOWN", "healthy": false}));
    }

    #[test]
    fn test_checkpoint_response_shapes() {
        let failed = serde_json::to_value(CheckpointResponse::from(&CheckpointOutcome::Failed(
            "Connection refused".into(),
        )))
        .unwrap();
        assert_eq!(failed["status"], "FAILED");
        assert_eq!(failed["error"], "Checkpoint failed: Connection refused");
        assert_eq!(failed["exception"], "CheckpointException");

        let unexpected =
            serde_json::to_value(CheckpointResponse::from(&CheckpointOutcome::UnexpectedReturn))
                .unwrap();
        assert_eq!(unexpected["status"], "UNEXPECTED_RETURN");
        assert!(unexpected.get("error").is_none());
    }
}
