//! Timeout-bound execution of the transformation collaborator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use docscrub_core::traits::{TransformError, TransformRequest, Transformer};
use docscrub_core::types::{JobId, JobStatus};
use docscrub_storage::LocalArtifactStore;

use crate::error::JobError;
use crate::ledger::StatusLedger;
use crate::metrics::LifecycleMetrics;

/// Result of a successful transformation.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    /// Job that was processed.
    pub job_id: JobId,
    /// Location of the output artifact.
    pub output: PathBuf,
    /// Wall time spent in the transformer.
    pub elapsed: Duration,
}

/// Runs the transformer under a hard deadline and records the outcome.
///
/// The caller marks the job `processing` before calling [`execute`]. On
/// return the ledger holds exactly one of `completed`, `timeout`, or
/// `error`. When the deadline fires first the transformer's cancellation
/// token is triggered and the call returns at once; stopping the abandoned
/// work is left to the transformer.
///
/// [`execute`]: TimeoutExecutor::execute
#[derive(Debug, Clone)]
pub struct TimeoutExecutor {
    /// The transformation collaborator.
    transformer: Arc<dyn Transformer>,
    /// Status ledger receiving the terminal status.
    ledger: StatusLedger,
    /// Artifact store.
    artifacts: LocalArtifactStore,
    /// Hard deadline for one transformation.
    deadline: Duration,
    /// Lifecycle metrics.
    metrics: Arc<LifecycleMetrics>,
}

impl TimeoutExecutor {
    /// Create a new executor.
    pub fn new(
        transformer: Arc<dyn Transformer>,
        ledger: StatusLedger,
        artifacts: LocalArtifactStore,
        deadline: Duration,
        metrics: Arc<LifecycleMetrics>,
    ) -> Self {
        Self {
            transformer,
            ledger,
            artifacts,
            deadline,
            metrics,
        }
    }

    /// The configured deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Name of the configured transformer.
    pub fn transformer_name(&self) -> &str {
        self.transformer.name()
    }

    /// Transform the input artifact of `job_id` and record the outcome.
    pub async fn execute(
        &self,
        job_id: JobId,
        input: PathBuf,
    ) -> Result<ProcessedArtifact, JobError> {
        let start = Instant::now();
        let outcome = self.run(job_id, input, start).await;

        let status = match &outcome {
            Ok(_) => JobStatus::Completed,
            Err(JobError::Timeout { .. }) => JobStatus::Timeout,
            Err(_) => JobStatus::Error,
        };
        self.ledger.set(job_id, status).await;

        match &outcome {
            Ok(artifact) => {
                self.metrics.record_processing_time(artifact.elapsed);
                info!(
                    job_id = %job_id,
                    transformer = self.transformer.name(),
                    elapsed_ms = artifact.elapsed.as_millis() as u64,
                    "Transformation completed"
                );
            }
            Err(JobError::Timeout {
                timeout_seconds, ..
            }) => {
                warn!(
                    job_id = %job_id,
                    transformer = self.transformer.name(),
                    timeout_seconds,
                    "Transformation timed out, cancellation signalled"
                );
            }
            Err(e) => {
                error!(
                    job_id = %job_id,
                    transformer = self.transformer.name(),
                    error = %e,
                    "Transformation failed"
                );
            }
        }

        outcome
    }

    /// Race the transformer task against the deadline.
    async fn run(
        &self,
        job_id: JobId,
        input: PathBuf,
        start: Instant,
    ) -> Result<ProcessedArtifact, JobError> {
        let expected = self.artifacts.paths().output_path(job_id);
        let request = TransformRequest {
            job_id,
            input,
            output: expected.clone(),
        };

        let cancel = CancellationToken::new();
        let transformer = Arc::clone(&self.transformer);
        let task_cancel = cancel.clone();
        let mut task =
            tokio::spawn(async move { transformer.transform(request, task_cancel).await });

        tokio::select! {
            joined = &mut task => {
                let output = match joined {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => return Err(transformation_failed(job_id, &e)),
                    Err(join_err) => {
                        return Err(JobError::Transformation {
                            job_id,
                            reason: format!("transformer task aborted: {join_err}"),
                        });
                    }
                };
                let output = self.settle_output(job_id, output, expected).await?;
                Ok(ProcessedArtifact {
                    job_id,
                    output,
                    elapsed: start.elapsed(),
                })
            }
            _ = tokio::time::sleep(self.deadline) => {
                // Dropping the handle detaches the task; it keeps the token.
                cancel.cancel();
                Err(JobError::Timeout {
                    job_id,
                    timeout_seconds: self.deadline.as_secs(),
                })
            }
        }
    }

    /// Ensure the output artifact exists at its canonical location.
    async fn settle_output(
        &self,
        job_id: JobId,
        reported: PathBuf,
        expected: PathBuf,
    ) -> Result<PathBuf, JobError> {
        if !self.artifacts.exists(&reported).await {
            return Err(transformation_failed(
                job_id,
                &TransformError::OutputMissing { path: reported },
            ));
        }

        if reported != expected {
            tokio::fs::rename(&reported, &expected)
                .await
                .map_err(|e| JobError::Transformation {
                    job_id,
                    reason: format!(
                        "failed to move output from {} to {}: {e}",
                        reported.display(),
                        expected.display()
                    ),
                })?;
        }

        Ok(expected)
    }
}

fn transformation_failed(job_id: JobId, err: &TransformError) -> JobError {
    JobError::Transformation {
        job_id,
        reason: err.to_string(),
    }
}
