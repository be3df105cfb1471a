//! Health Module
//!
//! Probes the key-value store and classifies the result.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::store::{current_timestamp_ms, KeyValueClient, PING_REPLY};

// == Public Constants ==
/// Prefix of the short-lived key written by the round-trip probe.
pub const PROBE_KEY_PREFIX: &str = "health:check:";

/// Value written and read back by the round-trip probe.
pub const PROBE_VALUE: &str = "test_connection";

// == Report Types ==
/// Overall store status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Outcome of the write/read/delete probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoundTrip {
    Pass,
    Fail,
}

/// Result of a detailed health check.
///
/// Serialized with absent fields omitted; the ping reply is reported as
/// `ping`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// UP when ping and round trip both succeeded
    pub status: HealthStatus,
    /// Raw reply to `PING`, absent when the ping failed
    #[serde(rename = "ping", skip_serializing_if = "Option::is_none")]
    pub ping_reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_trip: Option<RoundTrip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Best-effort number of keys in the whole store
    pub key_count: Option<u64>,
    /// First failure encountered, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    /// Report for a store that did not answer the ping.
    fn down(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Down,
            ping_reply: None,
            round_trip: None,
            key_count: None,
            error: Some(error.into()),
        }
    }

    /// Whether the read/write path was confirmed.
    pub fn round_trip_pass(&self) -> bool {
        self.round_trip == Some(RoundTrip::Pass)
    }

    /// Whether the store is reported UP.
    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}

// == Health Probe ==
/// Runs liveness and read/write checks against the store.
///
/// The round trip writes a timestamped key under [`PROBE_KEY_PREFIX`] and
/// always deletes it again, whatever the read returned.
pub struct HealthProbe {
    store: Arc<dyn KeyValueClient>,
}

impl HealthProbe {
    // == Constructor ==
    /// Creates a probe over `store`.
    pub fn new(store: Arc<dyn KeyValueClient>) -> Self {
        Self { store }
    }

    // == Detailed Check ==
    /// Ping, then a write/read/delete round trip, then a best-effort key count.
    ///
    /// Status is UP only when both the ping and the round trip succeed. A
    /// failed key count is logged and leaves `key_count` empty.
    pub async fn check_detailed(&self) -> HealthReport {
        let ping = match self.store.ping().await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Store health check failed: {}", e);
                return HealthReport::down(e.to_string());
            }
        };

        let mut report = HealthReport {
            status: HealthStatus::Up,
            ping_reply: Some(ping),
            round_trip: None,
            key_count: None,
            error: None,
        };

        match self.round_trip().await {
            Ok(true) => report.round_trip = Some(RoundTrip::Pass),
            Ok(false) => {
                warn!("Store round-trip returned a different value");
                report.status = HealthStatus::Down;
                report.round_trip = Some(RoundTrip::Fail);
            }
            Err(e) => {
                error!("Store round-trip failed: {}", e);
                report.status = HealthStatus::Down;
                report.round_trip = Some(RoundTrip::Fail);
                report.error = Some(e.to_string());
                return report;
            }
        }

        match self.store.keys("*").await {
            Ok(keys) => report.key_count = Some(keys.len() as u64),
            Err(e) => warn!("Could not count store keys: {}", e),
        }

        report
    }

    // == Simple Check ==
    /// Ping only; true when the store answers with its alive reply.
    pub async fn check_simple(&self) -> bool {
        match self.store.ping().await {
            Ok(reply) => reply == PING_REPLY,
            Err(e) => {
                error!("Store health check failed: {}", e);
                false
            }
        }
    }

    /// Writes, reads back and deletes a probe key; true when the value matched.
    async fn round_trip(&self) -> crate::error::Result<bool> {
        let probe_key = format!("{}{}", PROBE_KEY_PREFIX, current_timestamp_ms());
        let probe = Value::from(PROBE_VALUE);

        self.store.set(&probe_key, &probe).await?;
        let read_back = self.store.get(&probe_key).await;
        // always try to clean up, even if the read failed
        let deleted = self.store.delete(&probe_key).await;

        let read_back = read_back?;
        deleted?;
        Ok(read_back.as_ref() == Some(&probe))
    }
}
