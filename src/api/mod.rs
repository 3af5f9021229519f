//! API module - read-only presentation of the projected entities

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::bridge::BridgeState;

pub fn routes() -> Router<BridgeState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        // Entities
        .route("/api/entities", get(handlers::list_entities))
        .route("/api/entities/:unique_id", get(handlers::get_entity))
        // Coordinator
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/refresh", post(handlers::trigger_refresh))
}
