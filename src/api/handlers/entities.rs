//! Entity handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::bridge::BridgeState;
use crate::error::BridgeError;

/// GET /api/entities - List all entities as last rendered
pub async fn list_entities(State(state): State<BridgeState>) -> impl IntoResponse {
    Json(state.projector.entities().await)
}

/// GET /api/entities/:unique_id - Get a single entity
pub async fn get_entity(
    State(state): State<BridgeState>,
    Path(unique_id): Path<String>,
) -> Result<impl IntoResponse, BridgeError> {
    let entity = state
        .projector
        .entity(&unique_id)
        .await
        .ok_or_else(|| BridgeError::NotFound(format!("Entity {} not found", unique_id)))?;

    Ok(Json(entity))
}
