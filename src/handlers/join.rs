use crate::core::error::PresenceError;
use crate::core::state::AppState;
use crate::journal::journal::JournalOperation;
use crate::models::record::UserRecord;
use crate::utils::time::current_timestamp;
use crate::validation::params::JoinParams;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub success: bool,
    pub record: UserRecord,
}

/// Join handler
///
/// POST /join
///
/// Creates or replaces the caller's presence row, marks it discoverable and
/// stamps the heartbeat. A later join for the same id replaces the whole
/// row, last-write-wins; nothing is versioned. The row is journaled before
/// it becomes visible so a restart replays it.
#[instrument(skip(state, params))]
pub async fn join_handler(
    State(state): State<Arc<AppState>>,
    Json(params): Json<JoinParams>,
) -> Result<Response, PresenceError> {
    let validated = params.validate().map_err(|e| {
        warn!(error = %e, "Join validation failed");
        state.metrics.increment_failed();
        PresenceError::InvalidParameter(format!("{:#}", e))
    })?;

    let now = current_timestamp();
    let record = UserRecord::new(
        validated.student_id,
        validated.display_name,
        validated.interests,
        true,
        Some(now),
    );

    state
        .journal
        .log_operation(JournalOperation::Upsert {
            record: record.clone(),
        })
        .map_err(|e| {
            warn!(error = %e, "Failed to journal join");
            state.metrics.increment_failed();
            PresenceError::StoreUnavailable(e)
        })?;

    state.presence.upsert(record.clone());
    state.metrics.increment_joins();

    info!(
        student_id = %record.student_id,
        interests = record.interests.len(),
        "Student joined"
    );

    Ok((StatusCode::OK, Json(JoinResponse { success: true, record })).into_response())
}
