//! Registry of jobs with a processing attempt running.
//!
//! The orchestrator claims an entry before it marks a job `processing` and
//! holds it until the terminal status is recorded. The reaper consults the
//! same registry so it never forgets the status of a job that is in flight.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use docscrub_core::types::JobId;

/// Shared set of in-flight jobs.
#[derive(Debug, Clone, Default)]
pub struct ActiveJobs {
    /// Claimed identifiers.
    jobs: Arc<DashMap<JobId, ()>>,
}

impl ActiveJobs {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`. Returns `None` when another attempt already holds it.
    pub fn claim(&self, id: JobId) -> Option<ActiveJobGuard> {
        match self.jobs.entry(id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(ActiveJobGuard {
                    jobs: Arc::clone(&self.jobs),
                    id,
                })
            }
        }
    }

    /// Whether an attempt for `id` is running.
    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// Number of running attempts.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no attempt is running.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Marks a job in flight until dropped.
#[derive(Debug)]
pub struct ActiveJobGuard {
    jobs: Arc<DashMap<JobId, ()>>,
    id: JobId,
}

impl Drop for ActiveJobGuard {
    fn drop(&mut self) {
        self.jobs.remove(&self.id);
    }
}
