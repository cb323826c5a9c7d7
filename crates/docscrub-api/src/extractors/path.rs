//! Typed path parameter helpers.

use docscrub_core::error::AppError;
use docscrub_core::types::JobId;

/// Parses a job identifier from a path segment.
///
/// A malformed identifier cannot name an existing job, so it is reported
/// as not found rather than as a validation failure.
pub fn parse_job_id(s: &str) -> Result<JobId, AppError> {
    s.parse().map_err(|_| AppError::not_found("File not found"))
}
