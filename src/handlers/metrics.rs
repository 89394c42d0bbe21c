use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Metrics handler
///
/// GET /metrics
///
/// Returns a JSON snapshot of request counters plus table statistics.
/// The service has no auth model, so the endpoint is open like the rest.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state
        .metrics
        .get_snapshot(&state.presence, state.config.presence.freshness_window);

    (StatusCode::OK, Json(snapshot)).into_response()
}
