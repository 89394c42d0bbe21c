// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Presence lifecycle
        .route("/join", post(crate::handlers::join::join_handler))
        .route("/heartbeat", post(crate::handlers::heartbeat::heartbeat_handler))
        .route("/logout", post(crate::handlers::logout::logout_handler))
        // Peer matching
        .route("/peers", get(crate::handlers::peers::peers_handler))
        .route("/link", post(crate::handlers::link::link_handler))
        // Monitoring
        .route("/health", get(crate::handlers::health::health_handler))
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))
        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)
        .with_state(state)
}
