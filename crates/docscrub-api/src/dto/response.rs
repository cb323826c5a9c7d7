//! Response DTOs.

use serde::{Deserialize, Serialize};

use docscrub_core::types::{JobId, JobStatus};
use docscrub_worker::MetricsSnapshot;

/// Result of a processing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Job identifier.
    pub file_id: JobId,
    /// Terminal status, always `completed` on success.
    pub status: JobStatus,
    /// Whether the output can be downloaded.
    pub output_available: bool,
    /// Transformation time in seconds.
    pub processing_time: f64,
    /// Human-readable message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Server version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Configured transformer.
    pub transformer: String,
    /// Processing deadline in seconds.
    pub processing_timeout_seconds: u64,
    /// Jobs with a recorded status.
    pub tracked_jobs: u64,
    /// Processing attempts currently running.
    pub in_flight_jobs: usize,
    /// Lifecycle counters.
    pub metrics: MetricsSnapshot,
}
