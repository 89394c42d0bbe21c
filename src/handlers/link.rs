use crate::core::error::PresenceError;
use crate::core::state::AppState;
use crate::journal::journal::JournalOperation;
use crate::matching::engine::is_live;
use crate::utils::time::current_timestamp;
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
pub struct LinkParams {
    pub student_id: String,
    pub peer_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub success: bool,

    /// Whether the peer was live when the link was recorded. A link to a
    /// stale or absent peer is still recorded; delivery is best-effort
    /// either way.
    pub peer_live: bool,
}

/// Link handler
///
/// POST /link
///
/// Records that the requester wants to connect with a peer by writing
/// `linked_with` on the requester's own row. The peer discovers it on
/// their next /peers poll, at most once; there is no delivery guarantee
/// and no acknowledgement.
#[instrument(skip(state, params))]
pub async fn link_handler(
    State(state): State<Arc<AppState>>,
    Json(params): Json<LinkParams>,
) -> Result<Response, PresenceError> {
    let student_id = validate_student_id(&params.student_id).map_err(|e| {
        warn!(error = %e, "Link validation failed");
        state.metrics.increment_failed();
        PresenceError::InvalidParameter(format!("{:#}", e))
    })?;

    let peer_id = validate_student_id(&params.peer_id).map_err(|e| {
        warn!(error = %e, "Link validation failed");
        state.metrics.increment_failed();
        PresenceError::InvalidParameter(format!("{:#}", e))
    })?;

    if student_id == peer_id {
        state.metrics.increment_failed();
        return Err(PresenceError::InvalidParameter(
            "Cannot link with yourself".to_string(),
        ));
    }

    if state.presence.get(&student_id).is_none() {
        warn!(student_id = %student_id, "Link from unknown student");
        state.metrics.increment_failed();
        return Err(PresenceError::NotJoined(student_id));
    }

    state
        .journal
        .log_operation(JournalOperation::Link {
            student_id: student_id.clone(),
            peer_id: peer_id.clone(),
        })
        .map_err(|e| {
            warn!(error = %e, "Failed to journal link");
            state.metrics.increment_failed();
            PresenceError::StoreUnavailable(e)
        })?;

    state.presence.set_linked_with(&student_id, &peer_id);
    state.metrics.increment_links();

    let peer_live = state
        .presence
        .get(&peer_id)
        .map(|record| {
            is_live(
                &record,
                state.config.presence.freshness_window,
                current_timestamp(),
            )
        })
        .unwrap_or(false);

    info!(
        student_id = %student_id,
        peer_id = %peer_id,
        peer_live = peer_live,
        "Link recorded"
    );

    Ok((
        StatusCode::OK,
        Json(LinkResponse {
            success: true,
            peer_live,
        }),
    )
        .into_response())
}
