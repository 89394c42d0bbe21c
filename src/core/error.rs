// Centralized error handling for the presence service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Errors surfaced by the presence and matching handlers
#[derive(Error, Debug)]
pub enum PresenceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Student '{0}' has not joined")]
    NotJoined(String),

    #[error("Presence store unavailable")]
    StoreUnavailable(anyhow::Error),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl IntoResponse for PresenceError {
    fn into_response(self) -> Response {
        let status = match &self {
            PresenceError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            PresenceError::NotJoined(_) => StatusCode::NOT_FOUND,
            PresenceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PresenceError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
