//! Cache Gateway - An HTTP front end for a Redis-compatible key-value store
//!
//! Provides namespaced cache operations with optional expiry, a local
//! memoization layer, store health probes and a process checkpoint trigger.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod health;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::{Config, StoreBackend};
pub use error::{ApiError, CacheError};
pub use store::{KeyValueClient, MemoryStore, RedisClient};
pub use tasks::spawn_expiry_sweep;
