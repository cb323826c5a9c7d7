//! The document transformation collaborator.
//!
//! The transformation algorithm is opaque to the orchestrator: it receives
//! an input location and a suggested output location, and reports where it
//! wrote the result. It must observe the cancellation token and release its
//! own resources (child processes, temp files) once cancelled; the executor
//! does not wait for that to happen.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::types::JobId;

/// Input to a single transformation.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// Job being processed.
    pub job_id: JobId,
    /// Existing input artifact.
    pub input: PathBuf,
    /// Where the output artifact is expected to land.
    pub output: PathBuf,
}

/// Failure reported by a transformer.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The transformer observed the cancellation signal and stopped.
    #[error("Transformation was cancelled")]
    Cancelled,

    /// The external program exited unsuccessfully.
    #[error("Transformer exited with code {code}: {stderr}")]
    ProcessFailed {
        /// Exit code, or -1 when terminated by a signal.
        code: i32,
        /// Captured stderr output.
        stderr: String,
    },

    /// The transformer reported success but wrote nothing.
    #[error("Output file not created: {path}")]
    OutputMissing {
        /// Expected output path.
        path: PathBuf,
    },

    /// Any other failure.
    #[error("{0}")]
    Failed(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An asynchronous, cancellable document transformation.
#[async_trait]
pub trait Transformer: Send + Sync + std::fmt::Debug + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Transform `request.input` and return the output location.
    async fn transform(
        &self,
        request: TransformRequest,
        cancel: CancellationToken,
    ) -> Result<PathBuf, TransformError>;
}
