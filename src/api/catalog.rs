//! Catalog Handlers
//!
//! Plain-text endpoints over the memoized catalog lookup.

use axum::extract::{Path, State};

use super::AppState;

/// Handler for GET /api/catalog/:id
pub async fn get_catalog_handler(State(state): State<AppState>, Path(id): Path<String>) -> String {
    state.catalog.get_cached_data(&id).await
}

/// Handler for POST /api/catalog/:id
pub async fn put_catalog_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    data: String,
) -> String {
    state.catalog.update_cache(&id, data).await
}

/// Handler for DELETE /api/catalog/:id
pub async fn evict_catalog_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> String {
    state.catalog.evict(&id).await;
    format!("Cache evicted for id: {}", id)
}

/// Handler for DELETE /api/catalog/all
pub async fn evict_all_catalog_handler(State(state): State<AppState>) -> String {
    state.catalog.evict_all();
    "All cache entries evicted".to_string()
}
