//! Job lifecycle errors.

use docscrub_core::error::AppError;
use docscrub_core::types::JobId;
use thiserror::Error;

/// Failure of a job lifecycle operation.
///
/// Each variant other than `InFlight` corresponds to a status recorded in
/// the ledger, so callers that only poll status learn the same outcome.
#[derive(Debug, Error)]
pub enum JobError {
    /// No input artifact exists for the job.
    #[error("No input artifact for job {job_id}")]
    NotFound {
        /// The job that was looked up.
        job_id: JobId,
    },

    /// Another processing attempt for the job is still running.
    #[error("Job {job_id} is already being processed")]
    InFlight {
        /// The contested job.
        job_id: JobId,
    },

    /// The transformation did not finish before the deadline.
    #[error("Processing of job {job_id} timed out after {timeout_seconds}s")]
    Timeout {
        /// The job that timed out.
        job_id: JobId,
        /// The deadline that was exceeded.
        timeout_seconds: u64,
    },

    /// The transformation failed for any other reason.
    #[error("Processing of job {job_id} failed: {reason}")]
    Transformation {
        /// The job that failed.
        job_id: JobId,
        /// Underlying cause, for logs only.
        reason: String,
    },
}

impl JobError {
    /// The job this error concerns.
    pub fn job_id(&self) -> JobId {
        match self {
            Self::NotFound { job_id }
            | Self::InFlight { job_id }
            | Self::Timeout { job_id, .. }
            | Self::Transformation { job_id, .. } => *job_id,
        }
    }
}

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        match &err {
            JobError::NotFound { .. } => AppError::not_found("File not found"),
            JobError::InFlight { .. } => AppError::conflict(err.to_string()),
            JobError::Timeout {
                timeout_seconds, ..
            } => AppError::timeout(format!(
                "Processing timeout after {} minutes - file too complex. Try a smaller or simpler document.",
                (timeout_seconds / 60).max(1)
            )),
            // The cause is logged by the executor and never exposed.
            JobError::Transformation { .. } => AppError::transformation("Processing failed"),
        }
    }
}
