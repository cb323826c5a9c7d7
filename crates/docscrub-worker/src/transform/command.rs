//! External-program transformer.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, Command};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use docscrub_core::config::processing::CommandConfig;
use docscrub_core::traits::{TransformError, TransformRequest, Transformer};

/// Runs an external program once per job.
///
/// The child is killed when the cancellation token fires and also when the
/// transform future is dropped, so an abandoned job cannot leave a process
/// behind.
#[derive(Debug, Clone)]
pub struct CommandTransformer {
    /// Executable to run.
    program: PathBuf,
    /// Argument template with `{input}` and `{output}` placeholders.
    args: Vec<String>,
    /// Whether stderr is captured for error reports.
    capture_stderr: bool,
}

impl CommandTransformer {
    /// Create a transformer from configuration.
    pub fn from_config(config: &CommandConfig) -> Self {
        Self::new(&config.program, config.args.clone(), config.capture_stderr)
    }

    /// Create a transformer from an explicit program and argument template.
    pub fn new(program: impl AsRef<Path>, args: Vec<String>, capture_stderr: bool) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args,
            capture_stderr,
        }
    }

    /// Expand the argument template for one request.
    fn render_args(&self, request: &TransformRequest) -> Vec<String> {
        let input = request.input.to_string_lossy();
        let output = request.output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

#[async_trait]
impl Transformer for CommandTransformer {
    fn name(&self) -> &str {
        "command"
    }

    async fn transform(
        &self,
        request: TransformRequest,
        cancel: CancellationToken,
    ) -> Result<PathBuf, TransformError> {
        if cancel.is_cancelled() {
            return Err(TransformError::Cancelled);
        }

        let stderr_cfg = if self.capture_stderr {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(&request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr_cfg)
            .kill_on_drop(true);

        debug!(
            job_id = %request.job_id,
            program = %self.program.display(),
            "Spawning transformer process"
        );

        let start = Instant::now();
        let mut child = cmd.spawn()?;

        // Drain stderr concurrently so a chatty child cannot block on a full pipe.
        let stderr = child.stderr.take().map(|pipe| tokio::spawn(read_all(pipe)));

        tokio::select! {
            result = child.wait() => {
                let status = result?;
                let stderr_str = match stderr {
                    Some(task) => task.await.unwrap_or_default(),
                    None => String::new(),
                };

                if status.success() {
                    info!(
                        job_id = %request.job_id,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Transformer process finished"
                    );
                    if !tokio::fs::try_exists(&request.output).await.unwrap_or(false) {
                        return Err(TransformError::OutputMissing { path: request.output });
                    }
                    Ok(request.output)
                } else {
                    let code = status.code().unwrap_or(-1);
                    error!(
                        job_id = %request.job_id,
                        code,
                        stderr = %stderr_str,
                        "Transformer process failed"
                    );
                    Err(TransformError::ProcessFailed { code, stderr: stderr_str })
                }
            }
            _ = cancel.cancelled() => {
                info!(job_id = %request.job_id, "Transformation cancelled, killing process");
                let _ = child.kill().await;
                // A partial output must not be mistaken for a result.
                let _ = tokio::fs::remove_file(&request.output).await;
                Err(TransformError::Cancelled)
            }
        }
    }
}

async fn read_all(mut pipe: ChildStderr) -> String {
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).trim().to_string()
}
