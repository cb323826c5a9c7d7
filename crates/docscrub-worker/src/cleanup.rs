//! Artifact reclamation.
//!
//! Both cleanup mechanisms delete through [`ArtifactReaper`]. Deleting an
//! absent file succeeds, so the sweep and a per-job cleanup racing on the
//! same job do not interfere. A file younger than the retention window is
//! never deleted by either path.
//!
//! Once neither artifact of a job remains its status entry is dropped, so
//! the job reads back as `not_found`. A job with a processing attempt in
//! flight keeps its entry; its terminal status still has to be observed.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, error, info, warn};

use docscrub_core::error::AppError;
use docscrub_core::result::AppResult;
use docscrub_core::traits::Clock;
use docscrub_core::types::JobId;
use docscrub_storage::{ArtifactKind, LocalArtifactStore};

use crate::active::ActiveJobs;
use crate::ledger::StatusLedger;
use crate::metrics::LifecycleMetrics;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Directory entries examined.
    pub scanned: usize,
    /// Files deleted.
    pub removed: usize,
    /// Entries left alone because they are younger than the window.
    pub retained: usize,
    /// Entries whose deletion or inspection failed.
    pub failures: usize,
}

/// Outcome of a per-job cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Files deleted.
    pub removed: usize,
    /// Files left alone because they are younger than the window.
    pub retained: usize,
    /// Files whose deletion failed.
    pub failures: usize,
}

/// What happened to a single file.
enum Disposal {
    Removed,
    Absent,
    Retained,
    Failed,
}

/// Deletes artifacts older than a retention window.
#[derive(Debug, Clone)]
pub struct ArtifactReaper {
    /// Artifact store.
    artifacts: LocalArtifactStore,
    /// Ledger entries are dropped once a job has no artifacts left.
    ledger: StatusLedger,
    /// Jobs whose status entry must survive deletion of their files.
    active: ActiveJobs,
    /// Source of "now" for age comparisons.
    clock: Arc<dyn Clock>,
    /// Lifecycle metrics.
    metrics: Arc<LifecycleMetrics>,
}

impl ArtifactReaper {
    /// Create a new reaper.
    pub fn new(
        artifacts: LocalArtifactStore,
        ledger: StatusLedger,
        active: ActiveJobs,
        clock: Arc<dyn Clock>,
        metrics: Arc<LifecycleMetrics>,
    ) -> Self {
        Self {
            artifacts,
            ledger,
            active,
            clock,
            metrics,
        }
    }

    /// Scan both artifact directories and delete every file older than
    /// `retention`.
    ///
    /// A failure on one file is logged and counted and the pass continues.
    /// The pass fails only if a directory could not be listed, and only
    /// after the other directory has been processed.
    pub async fn sweep(&self, retention: Duration) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();
        let mut touched = HashSet::new();
        let mut listing_error: Option<AppError> = None;

        for kind in ArtifactKind::ALL {
            let entries = match self.artifacts.list(kind).await {
                Ok(entries) => entries,
                Err(e) => {
                    error!(kind = kind.as_str(), error = %e, "Failed to list artifact directory");
                    listing_error.get_or_insert(e);
                    continue;
                }
            };

            for entry in entries {
                report.scanned += 1;
                let Some(modified) = entry.modified else {
                    report.failures += 1;
                    self.metrics.record_cleanup_failure();
                    continue;
                };

                match self.dispose(&entry.path, modified, now, retention).await {
                    Disposal::Removed => {
                        report.removed += 1;
                        if let Some(id) = entry.job_id {
                            touched.insert(id);
                        }
                    }
                    Disposal::Absent => {
                        if let Some(id) = entry.job_id {
                            touched.insert(id);
                        }
                    }
                    Disposal::Retained => report.retained += 1,
                    Disposal::Failed => report.failures += 1,
                }
            }
        }

        for id in touched {
            self.forget_if_gone(id).await;
        }

        self.metrics.record_reclaimed(report.removed as u64);

        if let Some(e) = listing_error {
            return Err(e);
        }

        info!(
            scanned = report.scanned,
            removed = report.removed,
            retained = report.retained,
            failures = report.failures,
            "Cleanup sweep finished"
        );
        Ok(report)
    }

    /// Delete both artifacts of one job if they are older than `retention`.
    ///
    /// Each deletion is attempted on its own; a failure on the input does
    /// not prevent deleting the output.
    pub async fn purge_job(&self, id: JobId, retention: Duration) -> PurgeReport {
        let now = self.clock.now();
        let mut report = PurgeReport::default();

        for kind in ArtifactKind::ALL {
            let path = self.artifacts.paths().path_for(kind, id);
            let Some(modified) = self.artifacts.modified(&path).await else {
                continue;
            };

            match self.dispose(&path, modified, now, retention).await {
                Disposal::Removed => report.removed += 1,
                Disposal::Absent => {}
                Disposal::Retained => report.retained += 1,
                Disposal::Failed => report.failures += 1,
            }
        }

        self.forget_if_gone(id).await;
        self.metrics.record_reclaimed(report.removed as u64);

        debug!(
            job_id = %id,
            removed = report.removed,
            retained = report.retained,
            failures = report.failures,
            "Job cleanup finished"
        );
        report
    }

    /// Delete `path` if it is older than `retention`.
    async fn dispose(
        &self,
        path: &Path,
        modified: SystemTime,
        now: SystemTime,
        retention: Duration,
    ) -> Disposal {
        // A modification time in the future counts as brand new.
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= retention {
            return Disposal::Retained;
        }

        match self.artifacts.remove(path).await {
            Ok(true) => {
                debug!(path = %path.display(), age_secs = age.as_secs(), "Removed artifact");
                Disposal::Removed
            }
            Ok(false) => Disposal::Absent,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove artifact");
                self.metrics.record_cleanup_failure();
                Disposal::Failed
            }
        }
    }

    /// Drop the ledger entry once neither artifact of `id` remains and no
    /// processing attempt for it is running.
    async fn forget_if_gone(&self, id: JobId) {
        if self.active.contains(id) {
            debug!(job_id = %id, "Job in flight, status kept");
            return;
        }

        let paths = self.artifacts.paths();
        if !self.artifacts.exists(&paths.input_path(id)).await
            && !self.artifacts.exists(&paths.output_path(id)).await
        {
            self.ledger.forget(id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    use docscrub_core::traits::ManualClock;
    use docscrub_core::types::JobStatus;
    use docscrub_storage::ArtifactPaths;

    use crate::ledger::MemoryStatusStore;

    const RETENTION: Duration = Duration::from_secs(600);

    struct Harness {
        _dir: tempfile::TempDir,
        artifacts: LocalArtifactStore,
        ledger: StatusLedger,
        active: ActiveJobs,
        clock: Arc<ManualClock>,
        reaper: ArtifactReaper,
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("in"), dir.path().join("out"), "pdf");
        paths.ensure_directories().await.unwrap();
        let artifacts = LocalArtifactStore::new(paths);
        let metrics = Arc::new(LifecycleMetrics::new());
        let ledger = StatusLedger::new(
            Arc::new(MemoryStatusStore::new(Duration::from_secs(3600), 100)),
            artifacts.clone(),
            Arc::clone(&metrics),
        );
        let active = ActiveJobs::new();
        let clock = Arc::new(ManualClock::new());
        let reaper = ArtifactReaper::new(
            artifacts.clone(),
            ledger.clone(),
            active.clone(),
            clock.clone(),
            metrics,
        );
        Harness {
            _dir: dir,
            artifacts,
            ledger,
            active,
            clock,
            reaper,
        }
    }

    async fn completed_job(h: &Harness) -> JobId {
        let id = JobId::new();
        h.artifacts.write_input(id, Bytes::from("doc")).await.unwrap();
        tokio::fs::write(h.artifacts.paths().output_path(id), b"clean")
            .await
            .unwrap();
        h.ledger.set(id, JobStatus::Completed).await;
        id
    }

    #[tokio::test]
    async fn test_sweep_leaves_young_files() {
        let h = harness().await;
        let id = completed_job(&h).await;

        let report = h.reaper.sweep(RETENTION).await.unwrap();

        assert_eq!(report.removed, 0);
        assert_eq!(report.retained, 2);
        assert!(h.artifacts.exists(&h.artifacts.paths().input_path(id)).await);
        assert_eq!(h.ledger.get(id).await, JobStatus::Completed);
    }

    fn backdate(path: &Path, by: Duration) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[tokio::test]
    async fn test_sweep_removes_old_files_and_forgets_status() {
        let h = harness().await;
        let old = completed_job(&h).await;
        let young = completed_job(&h).await;
        for kind in ArtifactKind::ALL {
            backdate(
                &h.artifacts.paths().path_for(kind, old),
                RETENTION + Duration::from_secs(1),
            );
        }

        let report = h.reaper.sweep(RETENTION).await.unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(report.retained, 2);
        assert!(!h.artifacts.exists(&h.artifacts.paths().input_path(old)).await);
        assert!(!h.artifacts.exists(&h.artifacts.paths().output_path(old)).await);
        assert_eq!(h.ledger.get(old).await, JobStatus::NotFound);
        assert_eq!(h.ledger.get(young).await, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_sweep_continues_past_undeletable_entry() {
        let h = harness().await;
        let a = completed_job(&h).await;
        // A directory carrying an artifact name cannot be removed as a file.
        let blocker = JobId::new();
        tokio::fs::create_dir(h.artifacts.paths().input_path(blocker))
            .await
            .unwrap();
        let b = completed_job(&h).await;
        h.clock.advance(RETENTION * 2);

        let report = h.reaper.sweep(RETENTION).await.unwrap();

        assert_eq!(report.failures, 1);
        assert_eq!(report.removed, 4);
        for id in [a, b] {
            assert_eq!(h.ledger.get(id).await, JobStatus::NotFound);
        }
    }

    #[tokio::test]
    async fn test_sweep_reports_listing_failure_after_other_directory() {
        let h = harness().await;
        let id = completed_job(&h).await;
        h.clock.advance(RETENTION * 2);
        tokio::fs::remove_dir_all(h.artifacts.paths().dir_for(ArtifactKind::Input))
            .await
            .unwrap();

        assert!(h.reaper.sweep(RETENTION).await.is_err());
        assert!(!h.artifacts.exists(&h.artifacts.paths().output_path(id)).await);
    }

    #[tokio::test]
    async fn test_purge_job_respects_retention() {
        let h = harness().await;
        let id = completed_job(&h).await;

        let early = h.reaper.purge_job(id, RETENTION).await;
        assert_eq!(early.removed, 0);
        assert_eq!(early.retained, 2);

        h.clock.advance(RETENTION + Duration::from_secs(1));
        let late = h.reaper.purge_job(id, RETENTION).await;
        assert_eq!(late.removed, 2);
        assert_eq!(h.ledger.get(id).await, JobStatus::NotFound);

        let again = h.reaper.purge_job(id, RETENTION).await;
        assert_eq!(again, PurgeReport::default());
    }

    #[tokio::test]
    async fn test_purge_job_attempts_output_when_input_fails() {
        let h = harness().await;
        let id = JobId::new();
        tokio::fs::create_dir(h.artifacts.paths().input_path(id))
            .await
            .unwrap();
        tokio::fs::write(h.artifacts.paths().output_path(id), b"clean")
            .await
            .unwrap();
        h.clock.advance(RETENTION * 2);

        let report = h.reaper.purge_job(id, RETENTION).await;

        assert_eq!(report.failures, 1);
        assert_eq!(report.removed, 1);
        assert!(!h.artifacts.exists(&h.artifacts.paths().output_path(id)).await);
    }

    #[tokio::test]
    async fn test_in_flight_job_keeps_status_after_files_removed() {
        let h = harness().await;
        let id = JobId::new();
        h.artifacts.write_input(id, Bytes::from("doc")).await.unwrap();
        let guard = h.active.claim(id).unwrap();
        h.ledger.set(id, JobStatus::Processing).await;
        h.clock.advance(RETENTION * 2);

        let swept = h.reaper.sweep(RETENTION).await.unwrap();
        assert_eq!(swept.removed, 1);
        assert_eq!(h.ledger.get(id).await, JobStatus::Processing);

        let purged = h.reaper.purge_job(id, RETENTION).await;
        assert_eq!(purged, PurgeReport::default());
        assert_eq!(h.ledger.get(id).await, JobStatus::Processing);

        h.ledger.set(id, JobStatus::Error).await;
        drop(guard);
        h.reaper.purge_job(id, RETENTION).await;
        assert_eq!(h.ledger.get(id).await, JobStatus::NotFound);
    }
}
