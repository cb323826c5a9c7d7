//! Route definitions for the DocScrub HTTP API.
//!
//! Job routes are mounted under `/api`. The health check is also served at
//! `/` for load balancers.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.storage.max_upload_size_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    let api_routes = Router::new().merge(job_routes()).merge(health_routes());

    Router::new()
        .route("/", get(handlers::health::health))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Upload, processing, status, download, and diagnostics.
fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::job::upload))
        .route("/jobs/{id}/process", post(handlers::job::process))
        .route("/jobs/{id}/status", get(handlers::job::status))
        .route("/jobs/{id}/download", get(handlers::job::download))
        .route("/jobs/{id}/debug", get(handlers::job::debug))
}

/// Health check.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
