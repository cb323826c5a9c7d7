//! Read-only views of a job.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use docscrub_core::types::{JobId, JobStatus};

/// Status as reported to clients.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusReport {
    /// Job identifier.
    pub file_id: JobId,
    /// Current status.
    pub status: JobStatus,
    /// Advice for the client, when the status warrants one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// For `completed` jobs, whether the output is still on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_available: Option<bool>,
    /// When the status was read.
    pub timestamp: DateTime<Utc>,
}

/// Artifact-level view of a job, for troubleshooting.
#[derive(Debug, Clone, Serialize)]
pub struct JobDiagnostics {
    /// Job identifier.
    pub file_id: JobId,
    /// Current status.
    pub status: JobStatus,
    /// Whether a processing attempt is running right now.
    pub in_flight: bool,
    /// Whether the input artifact exists.
    pub input_exists: bool,
    /// Whether the output artifact exists.
    pub output_exists: bool,
    /// Input artifact location.
    pub input_path: PathBuf,
    /// Output artifact location.
    pub output_path: PathBuf,
    /// Input size in bytes, 0 when absent.
    pub input_size: u64,
    /// Output size in bytes, 0 when absent.
    pub output_size: u64,
    /// Last modification of the input artifact.
    pub input_modified: Option<DateTime<Utc>>,
    /// Last modification of the output artifact.
    pub output_modified: Option<DateTime<Utc>>,
}
