//! Redis Client Module
//!
//! [`KeyValueClient`] over a Redis server.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use tracing::{debug, info};

use super::{ttl_millis, KeyValueClient};
use crate::error::{CacheError, Result};

// == Redis Client ==
/// Redis-backed store client.
///
/// Holds a [`ConnectionManager`], a multiplexed connection that reconnects on
/// its own. Every command is bounded by `command_timeout` so a degraded
/// server cannot pin a request indefinitely.
///
/// Values are stored as JSON text.
#[derive(Clone)]
pub struct RedisClient {
    connection: ConnectionManager,
    command_timeout: Duration,
}

impl RedisClient {
    /// Connects to the Redis server at `url`.
    pub async fn connect(url: &str, command_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = tokio::time::timeout(command_timeout, client.get_connection_manager())
            .await
            .map_err(|_| {
                CacheError::StoreUnavailable(format!("timed out connecting to {}", url))
            })??;

        info!("Connected to Redis at {}", url);
        Ok(Self {
            connection,
            command_timeout,
        })
    }

    async fn run<T, F>(&self, command: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::StoreUnavailable(format!(
                "{} timed out after {}ms",
                command,
                self.command_timeout.as_millis()
            ))),
        }
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

fn encode(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode(raw: Option<String>) -> Result<Option<Value>> {
    match raw {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl KeyValueClient for RedisClient {
    async fn ping(&self) -> Result<String> {
        let mut con = self.connection.clone();
        self.run("PING", async move {
            let reply: String = redis::cmd("PING").query_async(&mut con).await?;
            Ok::<_, redis::RedisError>(reply)
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut con = self.connection.clone();
        let raw: Option<String> = self.run("GET", con.get(key)).await?;
        debug!("GET {} -> {}", key, if raw.is_some() { "hit" } else { "miss" });
        decode(raw)
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let payload = encode(value)?;
        let mut con = self.connection.clone();
        self.run("SET", con.set::<_, _, ()>(key, payload)).await
    }

    async fn set_with_ttl(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let millis = ttl_millis(ttl)?;
        if millis == 0 {
            return Err(CacheError::InvalidRequest(
                "TTL must be at least one millisecond".to_string(),
            ));
        }
        let payload = encode(value)?;
        let mut con = self.connection.clone();
        self.run("PSETEX", con.pset_ex::<_, _, ()>(key, payload, millis))
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut con = self.connection.clone();
        let removed: u64 = self.run("DEL", con.del(key)).await?;
        Ok(removed > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut con = self.connection.clone();
        self.run("DEL", con.del(keys)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut con = self.connection.clone();
        self.run("EXISTS", con.exists(key)).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut con = self.connection.clone();
        self.run("KEYS", con.keys(pattern)).await
    }

    async fn pttl(&self, key: &str) -> Result<i64> {
        let mut con = self.connection.clone();
        self.run("PTTL", con.pttl(key)).await
    }
}
