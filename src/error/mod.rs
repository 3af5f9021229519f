//! Error handling module

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Cannot connect: {0}")]
    CannotConnect(String),

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            BridgeError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            BridgeError::CannotConnect(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            BridgeError::UpdateFailed(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            BridgeError::MalformedResponse(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            BridgeError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            BridgeError::Http(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
