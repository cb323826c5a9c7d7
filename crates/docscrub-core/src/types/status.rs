//! Job lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a job.
///
/// Transitions observed for one job are always a subsequence of
/// `uploaded -> processing -> {completed | timeout | error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Input artifact written, not yet processed.
    Uploaded,
    /// A transformation is in flight.
    Processing,
    /// The transformation succeeded and produced an output artifact.
    Completed,
    /// The transformation exceeded its deadline.
    Timeout,
    /// The transformation failed.
    Error,
    /// No input artifact exists for the identifier.
    NotFound,
}

impl JobStatus {
    /// Check if the job reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Timeout | Self::Error)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::NotFound => "not_found",
        }
    }

    /// Client-facing explanation for the status, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Processing => Some("Processing in progress..."),
            Self::Timeout => Some("Processing timed out. Try a smaller or simpler document."),
            Self::Error => Some("Processing failed. Please try again."),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
