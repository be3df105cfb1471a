//! Admin Handlers
//!
//! Process checkpoint control.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::AppState;
use crate::checkpoint::CheckpointOutcome;
use crate::models::CheckpointResponse;

/// Handler for POST /admin/checkpoint
///
/// On a working snapshot runtime the process is suspended and this handler
/// only completes after a restore. Any response it does produce describes why
/// the checkpoint did not happen.
pub async fn checkpoint_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<CheckpointResponse>) {
    info!("Checkpoint trigger requested");

    let outcome = state.checkpoint.trigger().await;
    let status = match outcome {
        CheckpointOutcome::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
        CheckpointOutcome::Failed(_) | CheckpointOutcome::UnexpectedReturn => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(CheckpointResponse::from(&outcome)))
}
