//! Transformation settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which transformation collaborator to wire at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformerKind {
    /// Copy the input unchanged to the output location.
    Passthrough,
    /// Run an external program.
    Command,
}

/// Timeout-bound transformation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Hard wall-clock deadline for one transformation, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Transformer implementation.
    #[serde(default = "default_transformer")]
    pub transformer: TransformerKind,
    /// External program settings, used when `transformer = "command"`.
    #[serde(default)]
    pub command: CommandConfig,
}

impl ProcessingConfig {
    /// The processing deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            transformer: default_transformer(),
            command: CommandConfig::default(),
        }
    }
}

/// External transformation program.
///
/// `{input}` and `{output}` in `args` are replaced with the artifact paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Path to the executable.
    #[serde(default)]
    pub program: String,
    /// Argument template.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Whether to capture stderr for error reporting.
    #[serde(default = "default_true")]
    pub capture_stderr: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: default_args(),
            capture_stderr: true,
        }
    }
}

fn default_timeout() -> u64 {
    240 // 4 minutes
}

fn default_transformer() -> TransformerKind {
    TransformerKind::Passthrough
}

fn default_args() -> Vec<String> {
    vec!["{input}".to_string(), "{output}".to_string()]
}

fn default_true() -> bool {
    true
}
