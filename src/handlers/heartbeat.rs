use crate::core::error::PresenceError;
use crate::core::state::AppState;
use crate::utils::time::current_timestamp;
use crate::validation::params::validate_student_id;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct HeartbeatParams {
    pub student_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    pub last_seen: i64,
}

/// Heartbeat handler
///
/// POST /heartbeat
///
/// Refreshes `last_seen` and re-asserts discoverability on an existing row.
/// Clients are expected to call this on a fixed interval; rows whose
/// heartbeat ages past the freshness window drop out of matching.
/// Heartbeats are not journaled, so replayed rows stay hidden until the
/// next one arrives.
#[instrument(skip(state, params))]
pub async fn heartbeat_handler(
    State(state): State<Arc<AppState>>,
    Json(params): Json<HeartbeatParams>,
) -> Result<Response, PresenceError> {
    let student_id = validate_student_id(&params.student_id).map_err(|e| {
        warn!(error = %e, "Heartbeat validation failed");
        state.metrics.increment_failed();
        PresenceError::InvalidParameter(format!("{:#}", e))
    })?;

    let now = current_timestamp();

    if !state.presence.touch(&student_id, now) {
        warn!(student_id = %student_id, "Heartbeat for unknown student");
        state.metrics.increment_failed();
        return Err(PresenceError::NotJoined(student_id));
    }

    state.metrics.increment_heartbeats();
    debug!(student_id = %student_id, "Heartbeat recorded");

    Ok((
        StatusCode::OK,
        Json(HeartbeatResponse {
            success: true,
            last_seen: now,
        }),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::journal::journal::Journal;
    use crate::models::record::{parse_interests, UserRecord};
    use tempfile::TempDir;

    fn create_test_state() -> (Arc<AppState>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path().join("test.journal")).unwrap();

        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [presence]

            [logging]
            "#,
        )
        .unwrap();

        (Arc::new(AppState::new(config, journal)), temp_dir)
    }

    #[tokio::test]
    async fn test_heartbeat_refreshes_row() {
        let (state, _dir) = create_test_state();

        state.presence.upsert(UserRecord::new(
            "A".to_string(),
            "Ada".to_string(),
            parse_interests("python"),
            false,
            Some(1000),
        ));

        let response = heartbeat_handler(
            State(Arc::clone(&state)),
            Json(HeartbeatParams {
                student_id: "A".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let row = state.presence.get("A").unwrap();
        assert!(row.active);
        assert!(row.last_seen.unwrap() > 1000);
    }

    #[tokio::test]
    async fn test_heartbeat_unknown_student() {
        let (state, _dir) = create_test_state();

        let result = heartbeat_handler(
            State(state),
            Json(HeartbeatParams {
                student_id: "ghost".to_string(),
            }),
        )
        .await;

        assert!(result.is_err());
        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_heartbeat_invalid_id() {
        let (state, _dir) = create_test_state();

        let result = heartbeat_handler(
            State(state),
            Json(HeartbeatParams {
                student_id: "  ".to_string(),
            }),
        )
        .await;

        assert!(result.is_err());
        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
