//! Cache Handlers
//!
//! HTTP request handlers for the `/api/cache` endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use super::AppState;
use crate::cache::CacheEntry;
use crate::error::{ApiError, CacheError, ResultExt};
use crate::models::{
    ClearResponse, CreateRequest, CreateResponse, DeleteResponse, ExpirationResponse,
    GetResponse, KeysResponse, TtlParams, TtlResponse, UpdateRequest, UpdateResponse,
};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Handler for GET /api/cache/:key
///
/// Returns the stored value, or 404 when the key is absent.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<GetResponse>> {
    info!("GET request for key: {}", key);

    let value = state
        .cache
        .get(&key)
        .await
        .for_key("Failed to retrieve value", &key)?;

    match value {
        Some(value) => Ok(Json(GetResponse::found(key, value))),
        None => Err(ApiError::new(
            "Failed to retrieve value",
            &key,
            CacheError::NotFound(key.clone()),
        )),
    }
}

/// Handler for POST /api/cache
///
/// Stores a key-value pair, overwriting any existing value.
pub async fn create_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateResponse>)> {
    let Json(req) = payload.map_err(|rejection| {
        ApiError::global(
            "Invalid request body",
            CacheError::InvalidRequest(rejection.body_text()),
        )
    })?;

    if let Some(error_msg) = req.validate() {
        return Err(ApiError::new(
            "Invalid request body",
            &req.key,
            CacheError::InvalidRequest(error_msg),
        ));
    }
    info!("POST request to set key: {}", req.key);

    let key = req.key.clone();
    let stored = state
        .cache
        .put(CacheEntry::new(req.key, req.value))
        .await
        .for_key("Failed to store value", &key)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            key: stored.key,
            value: stored.value,
            created: true,
            timestamp: stored.created_at,
        }),
    ))
}

/// Handler for POST /api/cache/ttl?key&value&ttl&unit
///
/// Stores a value that the store evicts after the given TTL.
pub async fn create_with_ttl_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<TtlParams>, QueryRejection>,
) -> ApiResult<(StatusCode, Json<TtlResponse>)> {
    let Query(params) = params.map_err(|rejection| {
        ApiError::global(
            "Invalid parameters",
            CacheError::InvalidRequest(rejection.body_text()),
        )
    })?;

    let ttl = params.validate().map_err(|msg| {
        ApiError::new("Invalid parameters", &params.key, CacheError::InvalidRequest(msg))
    })?;
    info!(
        "POST request to set key: {} with TTL: {} {}",
        params.key, params.ttl, params.unit
    );

    state
        .cache
        .put_with_ttl(&params.key, Value::String(params.value.clone()), ttl)
        .await
        .for_key("Failed to store value with TTL", &params.key)?;

    Ok((
        StatusCode::CREATED,
        Json(TtlResponse {
            key: params.key,
            value: params.value,
            ttl: params.ttl,
            unit: params.unit,
            created: true,
        }),
    ))
}

/// Handler for PUT /api/cache/:key
///
/// Replaces the value of an existing key: 400 without a value, 404 when absent.
pub async fn update_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: std::result::Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateResponse>> {
    info!("PUT request to update key: {}", key);

    let Json(req) = payload.map_err(|rejection| {
        ApiError::new(
            "Invalid request body",
            &key,
            CacheError::InvalidRequest(rejection.body_text()),
        )
    })?;
    let Some(value) = req.value else {
        return Err(ApiError::new(
            "Invalid request body",
            &key,
            CacheError::InvalidRequest("Value is required".to_string()),
        ));
    };

    let value = state
        .cache
        .update(&key, value)
        .await
        .for_key("Failed to update value", &key)?;

    Ok(Json(UpdateResponse {
        key,
        value,
        updated: true,
    }))
}

/// Handler for DELETE /api/cache/:key
///
/// Removes a key; 404 when nothing was removed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE request for key: {}", key);

    let deleted = state
        .cache
        .delete(&key)
        .await
        .for_key("Failed to delete value", &key)?;

    if deleted {
        Ok(Json(DeleteResponse { key, deleted }))
    } else {
        Err(ApiError::new(
            "Failed to delete value",
            &key,
            CacheError::NotFound(key.clone()),
        ))
    }
}

/// Handler for GET /api/cache
///
/// Lists every key in the namespace.
pub async fn list_keys_handler(State(state): State<AppState>) -> ApiResult<Json<KeysResponse>> {
    info!("GET request for all keys");

    let keys = state
        .cache
        .list_keys()
        .await
        .global("Failed to retrieve keys")?;

    Ok(Json(KeysResponse::new(keys)))
}

/// Handler for DELETE /api/cache
///
/// Removes every key in the namespace.
pub async fn clear_handler(State(state): State<AppState>) -> ApiResult<Json<ClearResponse>> {
    info!("DELETE request to clear all cache");

    state
        .cache
        .clear_all()
        .await
        .global("Failed to clear cache")?;

    Ok(Json(ClearResponse::cleared()))
}

/// Handler for GET /api/cache/:key/expiration
///
/// Reports remaining lifetime in seconds with the -1 / -2 sentinels.
pub async fn expiration_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<ExpirationResponse>> {
    info!("GET request for expiration of key: {}", key);

    let ttl_ms = state
        .cache
        .ttl_remaining(&key)
        .await
        .for_key("Failed to get expiration", &key)?;

    Ok(Json(ExpirationResponse::from_millis(key, ttl_ms)))
}
