//! The job lifecycle orchestrator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use docscrub_core::config::CleanupConfig;
use docscrub_core::error::AppError;
use docscrub_core::result::AppResult;
use docscrub_core::types::{JobId, JobStatus};
use docscrub_storage::{ByteStream, LocalArtifactStore};
use docscrub_worker::{
    ActiveJobs, ArtifactReaper, CleanupScheduler, JobError, LifecycleMetrics, MetricsSnapshot,
    ProcessedArtifact, StatusLedger, SweepReport, TimeoutExecutor,
};

use super::report::{JobDiagnostics, JobStatusReport};
use super::upload::{UploadPolicy, UploadReceipt};

/// An output artifact opened for download.
pub struct OutputDownload {
    /// File content.
    pub stream: ByteStream,
    /// Size in bytes, when known.
    pub size: Option<u64>,
    /// Suggested attachment name.
    pub file_name: String,
}

impl std::fmt::Debug for OutputDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDownload")
            .field("size", &self.size)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Orchestrates upload, processing, status, and cleanup for jobs.
#[derive(Debug, Clone)]
pub struct JobService {
    /// Artifact store.
    artifacts: LocalArtifactStore,
    /// Status ledger.
    ledger: StatusLedger,
    /// Timeout-bound executor.
    executor: TimeoutExecutor,
    /// Artifact reaper, shared with the scheduler.
    reaper: Arc<ArtifactReaper>,
    /// Cleanup scheduler.
    scheduler: CleanupScheduler,
    /// Upload acceptance rules.
    policy: UploadPolicy,
    /// Cleanup timings.
    cleanup: CleanupConfig,
    /// Jobs currently being processed, shared with the reaper.
    active: ActiveJobs,
    /// Lifecycle metrics.
    metrics: Arc<LifecycleMetrics>,
}

impl JobService {
    /// Creates a new job service. Prefer [`crate::JobServiceBuilder`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        artifacts: LocalArtifactStore,
        ledger: StatusLedger,
        executor: TimeoutExecutor,
        reaper: Arc<ArtifactReaper>,
        scheduler: CleanupScheduler,
        policy: UploadPolicy,
        cleanup: CleanupConfig,
        active: ActiveJobs,
        metrics: Arc<LifecycleMetrics>,
    ) -> Self {
        Self {
            artifacts,
            ledger,
            executor,
            reaper,
            scheduler,
            policy,
            cleanup,
            active,
            metrics,
        }
    }

    /// Allocate a new job identifier. Nothing is written.
    pub fn create_job(&self) -> JobId {
        JobId::new()
    }

    /// Write the input artifact for `id`, record `uploaded`, and schedule
    /// its cleanup.
    pub async fn store_input(&self, id: JobId, data: Bytes) -> AppResult<PathBuf> {
        let path = self.artifacts.write_input(id, data).await?;
        self.ledger.set(id, JobStatus::Uploaded).await;
        self.schedule_cleanup(id, self.cleanup.job_cleanup_delay());
        Ok(path)
    }

    /// Validate and store an uploaded document as a new job.
    pub async fn upload(&self, file_name: &str, data: Bytes) -> AppResult<UploadReceipt> {
        self.policy.validate(file_name, data.len() as u64)?;

        let id = self.create_job();
        self.store_input(id, data).await?;
        info!(job_id = %id, file_name, "File uploaded");

        Ok(UploadReceipt {
            file_id: id,
            filename: file_name.to_string(),
            status: JobStatus::Uploaded,
            message: "File uploaded successfully. Ready for processing.".to_string(),
        })
    }

    /// Run the transformation for `id` and wait for its terminal status.
    ///
    /// Fails with [`JobError::NotFound`] when no input exists and with
    /// [`JobError::InFlight`] when another attempt for `id` is running; in
    /// both cases the ledger is untouched. Otherwise the job is marked
    /// `processing` and the executor records the terminal status.
    ///
    /// The attempt runs in its own task, so it finishes and its cleanup is
    /// scheduled even if the caller stops waiting.
    pub async fn start_processing(&self, id: JobId) -> Result<ProcessedArtifact, JobError> {
        // Claim before checking the input: a cleanup that deletes the input
        // after this point sees the claim and keeps the status entry.
        let guard = self
            .active
            .claim(id)
            .ok_or(JobError::InFlight { job_id: id })?;

        let input = self.artifacts.paths().input_path(id);
        if !self.artifacts.exists(&input).await {
            return Err(JobError::NotFound { job_id: id });
        }

        self.ledger.set(id, JobStatus::Processing).await;

        let executor = self.executor.clone();
        let scheduler = self.scheduler.clone();
        let delay = self.cleanup.job_cleanup_delay();
        let attempt = tokio::spawn(async move {
            let _guard = guard;
            let outcome = executor.execute(id, input).await;
            scheduler.schedule_job_cleanup(id, delay);
            outcome
        });

        match attempt.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(job_id = %id, error = %e, "Processing task aborted");
                self.ledger.set(id, JobStatus::Error).await;
                Err(JobError::Transformation {
                    job_id: id,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Current status of `id`.
    pub async fn get_status(&self, id: JobId) -> JobStatus {
        self.ledger.get(id).await
    }

    /// Status of `id` with client advice attached.
    pub async fn status_report(&self, id: JobId) -> JobStatusReport {
        let status = self.get_status(id).await;
        let output_available = if status == JobStatus::Completed {
            let output = self.artifacts.paths().output_path(id);
            Some(self.artifacts.exists(&output).await)
        } else {
            None
        };

        JobStatusReport {
            file_id: id,
            status,
            message: status.message().map(str::to_string),
            output_available,
            timestamp: Utc::now(),
        }
    }

    /// Location of the output artifact. Valid only for `completed` jobs
    /// whose output has not been cleaned up yet.
    pub async fn get_output_location(&self, id: JobId) -> AppResult<PathBuf> {
        if self.get_status(id).await != JobStatus::Completed {
            return Err(AppError::not_found("Processed file not available"));
        }

        let output = self.artifacts.paths().output_path(id);
        if !self.artifacts.exists(&output).await {
            return Err(AppError::not_found(
                "Processed file not found (may have been cleaned up)",
            ));
        }
        Ok(output)
    }

    /// Open the output artifact for streaming.
    pub async fn open_output(&self, id: JobId) -> AppResult<OutputDownload> {
        let path = self.get_output_location(id).await?;
        let size = self.artifacts.size(&path).await;
        let stream = self.artifacts.open(&path).await?;

        Ok(OutputDownload {
            stream,
            size,
            file_name: format!("cleaned_{id}.{}", self.artifacts.paths().extension()),
        })
    }

    /// Artifact-level view of `id`.
    pub async fn diagnostics(&self, id: JobId) -> JobDiagnostics {
        let paths = self.artifacts.paths();
        let input_path = paths.input_path(id);
        let output_path = paths.output_path(id);
        let input_size = self.artifacts.size(&input_path).await;
        let output_size = self.artifacts.size(&output_path).await;
        let input_modified = self.artifacts.modified(&input_path).await;
        let output_modified = self.artifacts.modified(&output_path).await;

        JobDiagnostics {
            file_id: id,
            status: self.get_status(id).await,
            in_flight: self.active.contains(id),
            input_exists: input_size.is_some(),
            output_exists: output_size.is_some(),
            input_size: input_size.unwrap_or(0),
            output_size: output_size.unwrap_or(0),
            input_modified: input_modified.map(DateTime::<Utc>::from),
            output_modified: output_modified.map(DateTime::<Utc>::from),
            input_path,
            output_path,
        }
    }

    /// Schedule deletion of the artifacts of `id` after `delay`.
    pub fn schedule_cleanup(&self, id: JobId, delay: Duration) -> JoinHandle<()> {
        self.scheduler.schedule_job_cleanup(id, delay)
    }

    /// Start the periodic sweep with explicit timings.
    pub fn start_sweep_loop(&self, interval: Duration, retention: Duration) -> JoinHandle<()> {
        self.scheduler.start_sweep_loop(interval, retention)
    }

    /// Start the periodic sweep with the configured timings.
    pub fn start_background_cleanup(&self) -> JoinHandle<()> {
        self.start_sweep_loop(self.cleanup.sweep_interval(), self.cleanup.retention())
    }

    /// Run one sweep pass now with the configured retention.
    pub async fn sweep_now(&self) -> AppResult<SweepReport> {
        self.reaper.sweep(self.cleanup.retention()).await
    }

    /// Lifecycle counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of jobs with a recorded status.
    pub fn tracked_jobs(&self) -> u64 {
        self.ledger.tracked()
    }

    /// Number of processing attempts currently running.
    pub fn in_flight_jobs(&self) -> usize {
        self.active.len()
    }

    /// Name of the configured transformer.
    pub fn transformer_name(&self) -> &str {
        self.executor.transformer_name()
    }

    /// The processing deadline.
    pub fn processing_timeout(&self) -> Duration {
        self.executor.deadline()
    }

    /// Upload acceptance rules.
    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.policy
    }
}
