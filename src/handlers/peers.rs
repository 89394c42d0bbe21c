use crate::core::error::PresenceError;
use crate::core::state::AppState;
use crate::matching::engine::{is_live, rank_peers, RankedPeer};
use crate::utils::time::current_timestamp;
use crate::validation::params::validate_student_id;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct PeersQuery {
    pub student_id: String,

    /// Maximum number of ranked peers to return
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeersResponse {
    /// Live peers ranked by interest similarity, best first
    pub peers: Vec<RankedPeer>,

    /// Live students whose last link action targeted the requester.
    /// Best-effort polling signal, may be missed if either side leaves.
    pub inbound_links: Vec<String>,

    pub timestamp: i64,
}

/// Peer list handler
///
/// GET /peers?student_id=X&limit=K
///
/// # Flow
/// 1. Validate the requester id
/// 2. Snapshot the presence table
/// 3. Filter to live rows and rank by Jaccard similarity
/// 4. Collect inbound link notifications for the requester
///
/// A requester with no row in the snapshot is ranked with an empty interest
/// set; an empty peer list is the normal "no matches yet" state.
#[instrument(skip(state, query))]
pub async fn peers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeersQuery>,
) -> Result<Response, PresenceError> {
    let student_id = validate_student_id(&query.student_id).map_err(|e| {
        warn!(error = %e, "Peers query validation failed");
        state.metrics.increment_failed();
        PresenceError::InvalidParameter(format!("{:#}", e))
    })?;

    let limit = query.limit.unwrap_or(state.config.matching.max_results);
    let window = state.config.presence.freshness_window;
    let now = current_timestamp();

    let snapshot = state.presence.snapshot();

    let peers = rank_peers(&student_id, &snapshot, &state.vocabulary, window, now, limit);

    let mut inbound_links: Vec<String> = snapshot
        .iter()
        .filter(|record| {
            record.student_id != student_id
                && is_live(record, window, now)
                && record.linked_with.as_deref() == Some(student_id.as_str())
        })
        .map(|record| record.student_id.clone())
        .collect();
    inbound_links.sort();

    state.metrics.increment_peer_queries();

    debug!(
        student_id = %student_id,
        snapshot_rows = snapshot.len(),
        peers_returned = peers.len(),
        inbound_links = inbound_links.len(),
        "Peer list computed"
    );

    Ok((
        StatusCode::OK,
        Json(PeersResponse {
            peers,
            inbound_links,
            timestamp: now,
        }),
    )
        .into_response())
}
