//! Error types for the cache gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for store and cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing store could not be reached or rejected the command
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Key not found in the store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// HTTP status this error maps to at the API boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::StoreUnavailable(_) | CacheError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status_code(), body).into_response()
    }
}

// == API Error ==
/// Error returned by HTTP handlers.
///
/// Wraps a [`CacheError`] with the operation that failed and the key it
/// touched, so every error body carries an `error` field and the relevant key.
#[derive(Debug)]
pub struct ApiError {
    context: &'static str,
    key: Option<String>,
    source: CacheError,
}

impl ApiError {
    /// Creates an error for an operation on a specific key.
    pub fn new(context: &'static str, key: impl Into<String>, source: CacheError) -> Self {
        Self {
            context,
            key: Some(key.into()),
            source,
        }
    }

    /// Creates an error for an operation that spans the whole namespace.
    pub fn global(context: &'static str, source: CacheError) -> Self {
        Self {
            context,
            key: None,
            source,
        }
    }

    /// The underlying cache error.
    pub fn source(&self) -> &CacheError {
        &self.source
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": format!("{}: {}", self.context, self.source),
        });
        if let Some(key) = self.key {
            body["key"] = json!(key);
        }

        (self.source.status_code(), Json(body)).into_response()
    }
}

/// Attaches handler context to a cache result.
pub trait ResultExt<T> {
    /// Converts the error into an [`ApiError`] for `key`.
    fn for_key(self, context: &'static str, key: &str) -> std::result::Result<T, ApiError>;

    /// Converts the error into an [`ApiError`] with no key.
    fn global(self, context: &'static str) -> std::result::Result<T, ApiError>;
}

impl<T> ResultExt<T> for Result<T> {
    fn for_key(self, context: &'static str, key: &str) -> std::result::Result<T, ApiError> {
        self.map_err(|e| ApiError::new(context, key, e))
    }

    fn global(self, context: &'static str) -> std::result::Result<T, ApiError> {
        self.map_err(|e| ApiError::global(context, e))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache gateway.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            CacheError::NotFound("k".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CacheError::InvalidRequest("k".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CacheError::StoreUnavailable("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_api_error_body_carries_key_and_cause() {
        let err = ApiError::new(
            "Failed to retrieve value",
            "user:1",
            CacheError::StoreUnavailable("connection refused".into()),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["key"], "user:1");
        let message = json["error"].as_str().unwrap();
        assert!(message.starts_with("Failed to retrieve value"));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_global_api_error_has_no_key() {
        let err = ApiError::global(
            "Failed to clear cache",
            CacheError::StoreUnavailable("timeout".into()),
        );
        let json = body_json(err.into_response()).await;
        assert!(json.get("key").is_none());
        assert!(json.get("error").is_some());
    }
}
