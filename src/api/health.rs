//! Health Handlers
//!
//! Store health endpoints. These never fail: an unhealthy store is reported
//! as a DOWN body with status 503.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::AppState;
use crate::health::HealthReport;
use crate::models::SimpleHealthResponse;

fn status_for(healthy: bool) -> StatusCode {
    if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Handler for GET /health/redis
pub async fn detailed_health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthReport>) {
    info!("Store health check requested");

    let report = state.health.check_detailed().await;
    (status_for(report.is_up()), Json(report))
}

/// Handler for GET /health/redis/simple
pub async fn simple_health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<SimpleHealthResponse>) {
    info!("Simple store health check requested");

    let healthy = state.health.check_simple().await;
    (status_for(healthy), Json(SimpleHealthResponse::new(healthy)))
}
