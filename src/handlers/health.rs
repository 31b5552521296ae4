//! Liveness check.

use axum::{extract::State, http::StatusCode};

use crate::db;
use crate::server::AppState;

/// `200 ok` when the database answers `SELECT 1`, `503 unavailable` otherwise.
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match db::health_check(&state.db).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}
