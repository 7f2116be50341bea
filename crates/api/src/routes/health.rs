use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Build phase of the service.
    pub phase: &'static str,
    /// Number of configured workers.
    pub workers: usize,
    /// Current server time (RFC 3339).
    pub time: String,
}

/// GET /health -- liveness probe; never touches the job queue.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "fluxengine",
        phase: "1-skeleton",
        workers: state.config.worker_count,
        time: chrono::Utc::now().to_rfc3339(),
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
