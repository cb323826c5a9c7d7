//! Job status ledger.
//!
//! The in-memory map only disambiguates in-flight states. The artifact
//! directories are the durable record, so a job with no ledger entry is
//! answered from the filesystem:
//!
//! | input | output | status      |
//! |-------|--------|-------------|
//! | no    | any    | `not_found` |
//! | yes   | yes    | `completed` |
//! | yes   | no     | `uploaded`  |
//!
//! After a restart a job that was `processing`, `timeout`, or `error` reads
//! back as `uploaded`. This is accepted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, info};

use docscrub_core::config::CleanupConfig;
use docscrub_core::traits::StatusStore;
use docscrub_core::types::{JobId, JobStatus};
use docscrub_storage::LocalArtifactStore;

use crate::metrics::LifecycleMetrics;

/// In-memory status store backed by moka.
///
/// Entries expire after a fixed time-to-live, which bounds the map without
/// any coordination with the cleanup code.
#[derive(Debug, Clone)]
pub struct MemoryStatusStore {
    /// The underlying moka cache.
    cache: Cache<JobId, JobStatus>,
}

impl MemoryStatusStore {
    /// Create a store with the given entry lifetime and capacity.
    pub fn new(time_to_live: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(time_to_live)
            .build();
        Self { cache }
    }

    /// Create a store from cleanup configuration.
    pub fn from_config(config: &CleanupConfig) -> Self {
        Self::new(config.status_ttl(), config.status_max_entries)
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn get(&self, id: JobId) -> Option<JobStatus> {
        self.cache.get(&id).await
    }

    async fn set(&self, id: JobId, status: JobStatus) {
        self.cache.insert(id, status).await;
    }

    async fn delete(&self, id: JobId) {
        self.cache.invalidate(&id).await;
    }

    fn len(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Status ledger: a [`StatusStore`] with a filesystem fallback.
#[derive(Debug, Clone)]
pub struct StatusLedger {
    /// Recorded statuses.
    store: Arc<dyn StatusStore>,
    /// Artifact store consulted when no status is recorded.
    artifacts: LocalArtifactStore,
    /// Lifecycle metrics.
    metrics: Arc<LifecycleMetrics>,
}

impl StatusLedger {
    /// Create a ledger over a store and the artifact directories.
    pub fn new(
        store: Arc<dyn StatusStore>,
        artifacts: LocalArtifactStore,
        metrics: Arc<LifecycleMetrics>,
    ) -> Self {
        Self {
            store,
            artifacts,
            metrics,
        }
    }

    /// Overwrite the status for `id`.
    pub async fn set(&self, id: JobId, status: JobStatus) {
        self.store.set(id, status).await;
        self.metrics.record_status(status);
        info!(job_id = %id, status = %status, "Job status updated");
    }

    /// Recorded status for `id`, or the status derived from its artifacts.
    pub async fn get(&self, id: JobId) -> JobStatus {
        if let Some(status) = self.store.get(id).await {
            return status;
        }

        let paths = self.artifacts.paths();
        let status = if !self.artifacts.exists(&paths.input_path(id)).await {
            JobStatus::NotFound
        } else if self.artifacts.exists(&paths.output_path(id)).await {
            JobStatus::Completed
        } else {
            JobStatus::Uploaded
        };

        debug!(job_id = %id, status = %status, "Status derived from filesystem");
        status
    }

    /// Drop the recorded status so `id` falls back to the filesystem.
    pub async fn forget(&self, id: JobId) {
        self.store.delete(id).await;
        debug!(job_id = %id, "Job status forgotten");
    }

    /// Number of recorded statuses. Approximate while evictions are pending.
    pub fn tracked(&self) -> u64 {
        self.store.len()
    }
}
