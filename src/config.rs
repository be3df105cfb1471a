//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which key-value store the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Remote Redis server
    Redis,
    /// In-process store, for local runs and tests
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis host name
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Upper bound for a single store command, in milliseconds
    pub redis_timeout_ms: u64,
    /// Store implementation to use
    pub store_backend: StoreBackend,
    /// Maximum entries in the in-process memo layer (0 disables it)
    pub memo_capacity: u64,
    /// Expiry sweep interval in seconds (memory backend only)
    pub cleanup_interval: u64,
    /// Simulated latency of the catalog lookup, in milliseconds
    pub catalog_load_delay_ms: u64,
    /// External command that snapshots the process, if any
    pub checkpoint_command: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_TIMEOUT_MS` - Per-command timeout (default: 2000)
    /// - `STORE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `MEMO_CAPACITY` - Memo layer size (default: 10000)
    /// - `CLEANUP_INTERVAL` - Memory backend sweep frequency in seconds (default: 1)
    /// - `CATALOG_LOAD_DELAY_MS` - Catalog lookup latency (default: 1000)
    /// - `CHECKPOINT_COMMAND` - Snapshot command, `{pid}` is substituted (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            redis_host: env::var("REDIS_HOST")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.redis_host),
            redis_port: parse_var("REDIS_PORT").unwrap_or(defaults.redis_port),
            redis_timeout_ms: parse_var("REDIS_TIMEOUT_MS").unwrap_or(defaults.redis_timeout_ms),
            store_backend: parse_var("STORE_BACKEND").unwrap_or(defaults.store_backend),
            memo_capacity: parse_var("MEMO_CAPACITY").unwrap_or(defaults.memo_capacity),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            catalog_load_delay_ms: parse_var("CATALOG_LOAD_DELAY_MS")
                .unwrap_or(defaults.catalog_load_delay_ms),
            checkpoint_command: env::var("CHECKPOINT_COMMAND")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Connection URL for the Redis client.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    /// Per-command store timeout.
    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms)
    }

    /// Simulated catalog lookup latency.
    pub fn catalog_load_delay(&self) -> Duration {
        Duration::from_millis(self.catalog_load_delay_ms)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            redis_timeout_ms: 2000,
            store_backend: StoreBackend::Redis,
            memo_capacity: 10_000,
            cleanup_interval: 1,
            catalog_load_delay_ms: 1000,
            checkpoint_command: None,
        }
    }
}
