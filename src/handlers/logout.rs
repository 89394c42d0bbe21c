use crate::core::error::PresenceError;
use crate::core::state::AppState;
use crate::journal::journal::JournalOperation;
use crate::validation::params::validate_student_id;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct LogoutParams {
    pub student_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Logout handler
///
/// POST /logout
///
/// Flips the row to not-discoverable. The row itself is kept; presence
/// rows accumulate and are never physically deleted.
#[instrument(skip(state, params))]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Json(params): Json<LogoutParams>,
) -> Result<Response, PresenceError> {
    let student_id = validate_student_id(&params.student_id).map_err(|e| {
        warn!(error = %e, "Logout validation failed");
        state.metrics.increment_failed();
        PresenceError::InvalidParameter(format!("{:#}", e))
    })?;

    if state.presence.get(&student_id).is_none() {
        warn!(student_id = %student_id, "Logout for unknown student");
        state.metrics.increment_failed();
        return Err(PresenceError::NotJoined(student_id));
    }

    state
        .journal
        .log_operation(JournalOperation::Logout {
            student_id: student_id.clone(),
        })
        .map_err(|e| {
            warn!(error = %e, "Failed to journal logout");
            state.metrics.increment_failed();
            PresenceError::StoreUnavailable(e)
        })?;

    state.presence.set_active(&student_id, false);
    state.metrics.increment_logouts();

    info!(student_id = %student_id, "Student logged out");

    Ok((StatusCode::OK, Json(LogoutResponse { success: true })).into_response())
}
