//! Cleanup scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sweep loop, per-job cleanup, and status ledger retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Interval between sweeps of both artifact directories.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Minimum age before a file may be deleted.
    #[serde(default = "default_retention")]
    pub retention_minutes: u64,
    /// Delay before retrying after a failed sweep iteration.
    #[serde(default = "default_failure_backoff")]
    pub failure_backoff_seconds: u64,
    /// Delay before a job's artifacts are deleted by its scheduled cleanup.
    #[serde(default = "default_job_delay")]
    pub job_cleanup_delay_minutes: u64,
    /// Time-to-live of an in-memory status entry.
    #[serde(default = "default_status_ttl")]
    pub status_ttl_seconds: u64,
    /// Maximum number of in-memory status entries.
    #[serde(default = "default_status_capacity")]
    pub status_max_entries: u64,
}

impl CleanupConfig {
    /// Sweep interval as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    /// Retention window as a [`Duration`].
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_minutes * 60)
    }

    /// Backoff after a failed sweep as a [`Duration`].
    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff_seconds)
    }

    /// Per-job cleanup delay as a [`Duration`].
    pub fn job_cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.job_cleanup_delay_minutes * 60)
    }

    /// Status entry time-to-live as a [`Duration`].
    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_seconds)
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_interval(),
            retention_minutes: default_retention(),
            failure_backoff_seconds: default_failure_backoff(),
            job_cleanup_delay_minutes: default_job_delay(),
            status_ttl_seconds: default_status_ttl(),
            status_max_entries: default_status_capacity(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    600
}

fn default_retention() -> u64 {
    10
}

fn default_failure_backoff() -> u64 {
    60
}

fn default_job_delay() -> u64 {
    10
}

fn default_status_ttl() -> u64 {
    1800
}

fn default_status_capacity() -> u64 {
    100_000
}
