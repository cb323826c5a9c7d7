//! Cleanup scheduling: the periodic sweep and per-job delayed cleanup.
//!
//! The sweep loop must outlive every failure. Each pass runs in its own
//! task, so an error or a panic inside a pass costs one pass and switches
//! the loop to the shorter backoff delay. Only the shutdown signal ends it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info};

use docscrub_core::config::CleanupConfig;
use docscrub_core::types::JobId;

use crate::cleanup::ArtifactReaper;
use crate::metrics::LifecycleMetrics;

/// Drives [`ArtifactReaper`] on timers.
#[derive(Debug, Clone)]
pub struct CleanupScheduler {
    /// Shared reaper.
    reaper: Arc<ArtifactReaper>,
    /// Retention window applied by per-job cleanups.
    retention: Duration,
    /// Delay before retrying a failed sweep.
    failure_backoff: Duration,
    /// Shutdown signal.
    shutdown: watch::Receiver<bool>,
    /// Lifecycle metrics.
    metrics: Arc<LifecycleMetrics>,
}

impl CleanupScheduler {
    /// Create a new scheduler.
    pub fn new(
        reaper: Arc<ArtifactReaper>,
        config: &CleanupConfig,
        shutdown: watch::Receiver<bool>,
        metrics: Arc<LifecycleMetrics>,
    ) -> Self {
        Self {
            reaper,
            retention: config.retention(),
            failure_backoff: config.failure_backoff(),
            shutdown,
            metrics,
        }
    }

    /// Start the periodic sweep.
    ///
    /// The first pass runs immediately. After a successful pass the loop
    /// waits `interval`; after a failed one it waits the failure backoff.
    /// The task ends when shutdown is signalled or its sender is dropped.
    pub fn start_sweep_loop(&self, interval: Duration, retention: Duration) -> JoinHandle<()> {
        let reaper = Arc::clone(&self.reaper);
        let metrics = Arc::clone(&self.metrics);
        let backoff = self.failure_backoff;
        let mut shutdown = self.shutdown.clone();

        info!(
            interval_secs = interval.as_secs(),
            retention_secs = retention.as_secs(),
            backoff_secs = backoff.as_secs(),
            "Cleanup sweep loop started"
        );

        tokio::spawn(async move {
            loop {
                let pass_reaper = Arc::clone(&reaper);
                let pass = tokio::spawn(async move { pass_reaper.sweep(retention).await });

                let wait = match pass.await {
                    Ok(Ok(_)) => {
                        metrics.record_sweep(true);
                        interval
                    }
                    Ok(Err(e)) => {
                        metrics.record_sweep(false);
                        error!(error = %e, backoff_secs = backoff.as_secs(), "Cleanup sweep failed");
                        backoff
                    }
                    Err(e) => {
                        metrics.record_sweep(false);
                        error!(error = %e, backoff_secs = backoff.as_secs(), "Cleanup sweep aborted");
                        backoff
                    }
                };

                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    _ = time::sleep(wait) => {}
                }
            }

            info!("Cleanup sweep loop stopped");
        })
    }

    /// Delete the artifacts of `id` once `delay` has elapsed.
    ///
    /// The cleanup fires regardless of the status the job reached. Files
    /// still younger than the retention window are left for a later pass.
    pub fn schedule_job_cleanup(&self, id: JobId, delay: Duration) -> JoinHandle<()> {
        let reaper = Arc::clone(&self.reaper);
        let retention = self.retention;
        let mut shutdown = self.shutdown.clone();

        debug!(job_id = %id, delay_secs = delay.as_secs(), "Job cleanup scheduled");

        tokio::spawn(async move {
            // A dropped sender counts as shutdown.
            let stopped = async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            };

            tokio::select! {
                _ = stopped => {
                    debug!(job_id = %id, "Job cleanup abandoned at shutdown");
                }
                _ = time::sleep(delay) => {
                    reaper.purge_job(id, retention).await;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    use docscrub_core::traits::ManualClock;
    use docscrub_core::types::JobStatus;
    use docscrub_storage::{ArtifactKind, ArtifactPaths, LocalArtifactStore};

    use crate::active::ActiveJobs;
    use crate::ledger::{MemoryStatusStore, StatusLedger};

    struct Harness {
        _dir: tempfile::TempDir,
        artifacts: LocalArtifactStore,
        ledger: StatusLedger,
        clock: Arc<ManualClock>,
        metrics: Arc<LifecycleMetrics>,
        scheduler: CleanupScheduler,
        shutdown: watch::Sender<bool>,
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
        let clock = Arc::new(ManualClock::new());
        let reaper = Arc::new(ArtifactReaper::new(
            artifacts.clone(),
            ledger.clone(),
            ActiveJobs::new(),
            clock.clone(),
            Arc::clone(&metrics),
        ));
        let (shutdown, rx) = watch::channel(false);
        let scheduler =
            CleanupScheduler::new(reaper, &CleanupConfig::default(), rx, Arc::clone(&metrics));
        Harness {
            _dir: dir,
            artifacts,
            ledger,
            clock,
            metrics,
            scheduler,
            shutdown,
        }
    }

    /// Let paused time run forward until `done` holds or a minute passes.
    async fn settle(mut done: impl FnMut() -> bool) {
        for _ in 0..600 {
            if done() {
                return;
            }
            time::sleep(Duration::from_millis(100)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_loop_runs_on_interval() {
        let h = harness().await;
        let task = h
            .scheduler
            .start_sweep_loop(Duration::from_secs(600), Duration::from_secs(600));

        settle(|| h.metrics.snapshot().sweeps_completed == 1).await;
        assert_eq!(h.metrics.snapshot().sweeps_completed, 1);

        time::sleep(Duration::from_secs(600)).await;
        settle(|| h.metrics.snapshot().sweeps_completed == 2).await;
        assert_eq!(h.metrics.snapshot().sweeps_completed, 2);

        h.shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_loop_backs_off_and_recovers() {
        let h = harness().await;
        let input_dir = h.artifacts.paths().dir_for(ArtifactKind::Input).to_path_buf();
        tokio::fs::remove_dir_all(&input_dir).await.unwrap();

        let task = h
            .scheduler
            .start_sweep_loop(Duration::from_secs(600), Duration::from_secs(600));

        settle(|| h.metrics.snapshot().sweeps_failed == 1).await;
        assert_eq!(h.metrics.snapshot().sweeps_failed, 1);

        tokio::fs::create_dir_all(&input_dir).await.unwrap();

        // The retry comes after the 60s backoff, well before the interval.
        time::sleep(Duration::from_secs(61)).await;
        settle(|| h.metrics.snapshot().sweeps_completed == 1).await;
        let snap = h.metrics.snapshot();
        assert_eq!(snap.sweeps_failed, 1);
        assert_eq!(snap.sweeps_completed, 1);
        assert!(!task.is_finished());

        h.shutdown.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_loop_stops_when_sender_dropped() {
        let h = harness().await;
        let task = h
            .scheduler
            .start_sweep_loop(Duration::from_secs(600), Duration::from_secs(600));
        settle(|| h.metrics.snapshot().sweeps_completed == 1).await;

        drop(h.shutdown);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_cleanup_fires_after_delay() {
        let h = harness().await;
        let id = JobId::new();
        h.artifacts.write_input(id, Bytes::from("doc")).await.unwrap();
        h.ledger.set(id, JobStatus::Uploaded).await;

        let task = h.scheduler.schedule_job_cleanup(id, Duration::from_secs(600));
        h.clock.advance(Duration::from_secs(601));
        task.await.unwrap();

        assert!(!h.artifacts.exists(&h.artifacts.paths().input_path(id)).await);
        assert_eq!(h.ledger.get(id).await, JobStatus::NotFound);
        assert_eq!(h.metrics.snapshot().files_reclaimed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_cleanup_abandoned_on_shutdown() {
        let h = harness().await;
        let id = JobId::new();
        h.artifacts.write_input(id, Bytes::from("doc")).await.unwrap();
        h.clock.advance(Duration::from_secs(3600));

        let task = h.scheduler.schedule_job_cleanup(id, Duration::from_secs(600));
        h.shutdown.send(true).unwrap();
        task.await.unwrap();

        assert!(h.artifacts.exists(&h.artifacts.paths().input_path(id)).await);
    }
}
