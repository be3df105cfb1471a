//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::admin::checkpoint_handler;
use super::catalog::{
    evict_all_catalog_handler, evict_catalog_handler, get_catalog_handler, put_catalog_handler,
};
use super::handlers::{
    clear_handler, create_handler, create_with_ttl_handler, delete_handler, expiration_handler,
    get_handler, list_keys_handler, update_handler,
};
use super::health::{detailed_health_handler, simple_health_handler};
use super::AppState;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/cache", get(list_keys_handler).post(create_handler).delete(clear_handler))
        .route("/api/cache/ttl", post(create_with_ttl_handler))
        .route(
            "/api/cache/:key",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/cache/:key/expiration", get(expiration_handler))
        .route("/api/catalog/all", delete(evict_all_catalog_handler))
        .route(
            "/api/catalog/:id",
            get(get_catalog_handler)
                .post(put_catalog_handler)
                .delete(evict_catalog_handler),
        )
        .route("/health/redis", get(detailed_health_handler))
        .route("/health/redis/simple", get(simple_health_handler))
        .route("/admin/checkpoint", post(checkpoint_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
