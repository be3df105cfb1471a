//! API Module
//!
//! HTTP handlers and routing for the cache gateway REST API.
//!
//! # Endpoints
//! - `GET /api/cache/:key` - Retrieve a value
//! - `POST /api/cache` - Store a value
//! - `POST /api/cache/ttl` - Store a value with expiry
//! - `PUT /api/cache/:key` - Update an existing value
//! - `DELETE /api/cache/:key` - Delete a value
//! - `GET /api/cache` - List keys
//! - `DELETE /api/cache` - Clear all values
//! - `GET /api/cache/:key/expiration` - Remaining lifetime
//! - `GET /health/redis`, `GET /health/redis/simple` - Store health
//! - `POST /admin/checkpoint` - Trigger a process checkpoint
//! - `/api/catalog/...` - Memoized catalog lookups

pub mod admin;
pub mod catalog;
pub mod handlers;
pub mod health;
pub mod routes;
mod state;

pub use handlers::*;
pub use routes::create_router;
pub use state::AppState;
