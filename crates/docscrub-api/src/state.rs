//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use docscrub_core::config::AppConfig;
use docscrub_service::JobService;

/// Shared application state passed to handlers via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Job lifecycle orchestrator.
    pub jobs: Arc<JobService>,
    /// When the server started.
    pub started_at: Instant,
}

impl AppState {
    /// Create state for a freshly started server.
    pub fn new(config: AppConfig, jobs: JobService) -> Self {
        Self {
            config: Arc::new(config),
            jobs: Arc::new(jobs),
            started_at: Instant::now(),
        }
    }
}
