//! Coordinator handlers

use axum::{extract::State, response::IntoResponse, Json};

use crate::bridge::BridgeState;
use crate::error::BridgeError;

/// GET /api/snapshot - Current coordinator state
pub async fn get_snapshot(State(state): State<BridgeState>) -> impl IntoResponse {
    Json(state.coordinator.current())
}

/// POST /api/refresh - Run one poll cycle now
pub async fn trigger_refresh(
    State(state): State<BridgeState>,
) -> Result<impl IntoResponse, BridgeError> {
    state.coordinator.update().await?;
    tracing::info!("[API] Manual refresh completed");

    Ok(Json(state.coordinator.current()))
}
