//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let jobs = &state.jobs;

    Json(HealthResponse {
        status: "ok".to_string(),
        service: "docscrub".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        transformer: jobs.transformer_name().to_string(),
        processing_timeout_seconds: jobs.processing_timeout().as_secs(),
        tracked_jobs: jobs.tracked_jobs(),
        in_flight_jobs: jobs.in_flight_jobs(),
        metrics: jobs.metrics(),
    })
}
