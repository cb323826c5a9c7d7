//! Storage backend for in-memory job status entries.

use async_trait::async_trait;

use crate::types::{JobId, JobStatus};

/// Keyed status storage with atomic per-key reads and writes.
///
/// The store is not the source of truth for whether a job exists; the
/// artifact directories are. A missing entry is answered by the caller
/// from the filesystem.
#[async_trait]
pub trait StatusStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the recorded status, if any.
    async fn get(&self, id: JobId) -> Option<JobStatus>;

    /// Overwrite the status for `id`.
    async fn set(&self, id: JobId, status: JobStatus);

    /// Drop the entry for `id`. Removing a missing entry is a no-op.
    async fn delete(&self, id: JobId);

    /// Number of entries currently held.
    fn len(&self) -> u64;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
