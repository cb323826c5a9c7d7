//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an empty
//! configuration is valid.

pub mod app;
pub mod cleanup;
pub mod logging;
pub mod processing;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::cleanup::CleanupConfig;
pub use self::logging::LoggingConfig;
pub use self::processing::{ProcessingConfig, TransformerKind};
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Artifact storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Transformation settings.
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Sweep and per-job cleanup settings.
    #[serde(default)]
    pub cleanup: CleanupConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// (`config/<env>.toml`) and environment variables prefixed with
    /// `DOCSCRUB__` (e.g. `DOCSCRUB__CLEANUP__RETENTION_MINUTES=5`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from a custom configuration directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCSCRUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would break the lifecycle guarantees.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.processing.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "processing.timeout_seconds must be greater than zero",
            ));
        }
        if self.cleanup.sweep_interval_seconds == 0 {
            return Err(AppError::configuration(
                "cleanup.sweep_interval_seconds must be greater than zero",
            ));
        }
        if self.cleanup.failure_backoff_seconds == 0 {
            return Err(AppError::configuration(
                "cleanup.failure_backoff_seconds must be greater than zero",
            ));
        }
        if self.storage.upload_dir == self.storage.output_dir {
            return Err(AppError::configuration(
                "storage.upload_dir and storage.output_dir must differ",
            ));
        }
        if self.processing.transformer == TransformerKind::Command
            && self.processing.command.program.is_empty()
        {
            return Err(AppError::configuration(
                "processing.command.program is required for the command transformer",
            ));
        }
        Ok(())
    }
}
