//! Job lifecycle metrics.
//!
//! Counters for jobs moving through the ledger and for the cleanup
//! machinery. Thread-safe via atomics; a snapshot is served by the health
//! endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use docscrub_core::types::JobStatus;

/// Lifecycle metrics collector.
#[derive(Debug, Default)]
pub struct LifecycleMetrics {
    /// Jobs that received an input artifact.
    pub jobs_created: AtomicU64,
    /// Processing attempts started.
    pub processing_started: AtomicU64,
    /// Jobs that reached `completed`.
    pub jobs_completed: AtomicU64,
    /// Jobs that reached `timeout`.
    pub jobs_timed_out: AtomicU64,
    /// Jobs that reached `error`.
    pub jobs_failed: AtomicU64,
    /// Sum of processing durations of completed jobs, in milliseconds.
    pub processing_millis_total: AtomicU64,
    /// Artifact files deleted by either cleanup mechanism.
    pub files_reclaimed: AtomicU64,
    /// Individual file deletions that failed.
    pub cleanup_failures: AtomicU64,
    /// Sweeps that ran to completion.
    pub sweeps_completed: AtomicU64,
    /// Sweeps that aborted and triggered the backoff.
    pub sweeps_failed: AtomicU64,
}

impl LifecycleMetrics {
    /// Create a new empty metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a status transition written to the ledger.
    pub fn record_status(&self, status: JobStatus) {
        let counter = match status {
            JobStatus::Uploaded => &self.jobs_created,
            JobStatus::Processing => &self.processing_started,
            JobStatus::Completed => &self.jobs_completed,
            JobStatus::Timeout => &self.jobs_timed_out,
            JobStatus::Error => &self.jobs_failed,
            JobStatus::NotFound => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the duration of a completed transformation.
    pub fn record_processing_time(&self, elapsed: Duration) {
        self.processing_millis_total.fetch_add(
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
    }

    /// Record deleted artifact files.
    pub fn record_reclaimed(&self, files: u64) {
        self.files_reclaimed.fetch_add(files, Ordering::Relaxed);
    }

    /// Record a failed file deletion.
    pub fn record_cleanup_failure(&self) {
        self.cleanup_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one sweep pass.
    pub fn record_sweep(&self, succeeded: bool) {
        if succeeded {
            self.sweeps_completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.sweeps_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get the current snapshot of metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let jobs_completed = self.jobs_completed.load(Ordering::Relaxed);
        let total_ms = self.processing_millis_total.load(Ordering::Relaxed);

        MetricsSnapshot {
            jobs_created: self.jobs_created.load(Ordering::Relaxed),
            processing_started: self.processing_started.load(Ordering::Relaxed),
            jobs_completed,
            jobs_timed_out: self.jobs_timed_out.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            avg_processing_ms: total_ms.checked_div(jobs_completed).unwrap_or(0),
            files_reclaimed: self.files_reclaimed.load(Ordering::Relaxed),
            cleanup_failures: self.cleanup_failures.load(Ordering::Relaxed),
            sweeps_completed: self.sweeps_completed.load(Ordering::Relaxed),
            sweeps_failed: self.sweeps_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of lifecycle metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Jobs that received an input artifact.
    pub jobs_created: u64,
    /// Processing attempts started.
    pub processing_started: u64,
    /// Jobs that reached `completed`.
    pub jobs_completed: u64,
    /// Jobs that reached `timeout`.
    pub jobs_timed_out: u64,
    /// Jobs that reached `error`.
    pub jobs_failed: u64,
    /// Mean processing time of completed jobs.
    pub avg_processing_ms: u64,
    /// Artifact files deleted.
    pub files_reclaimed: u64,
    /// Failed file deletions.
    pub cleanup_failures: u64,
    /// Sweeps that ran to completion.
    pub sweeps_completed: u64,
    /// Sweeps that aborted.
    pub sweeps_failed: u64,
}
