//! Upload validation.

use std::path::Path;

use serde::Serialize;

use docscrub_core::config::StorageConfig;
use docscrub_core::error::AppError;
use docscrub_core::types::{JobId, JobStatus};

/// Acceptance rules for uploaded documents.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Accepted extensions, lowercase, without the dot.
    allowed_extensions: Vec<String>,
    /// Maximum accepted size in bytes.
    max_bytes: u64,
}

impl UploadPolicy {
    /// Build the policy from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_bytes: config.max_upload_size_bytes,
        }
    }

    /// Maximum accepted size in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check a client file name and payload size.
    pub fn validate(&self, file_name: &str, size: u64) -> Result<(), AppError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension {
            Some(ext) if self.allowed_extensions.contains(&ext) => {}
            _ => {
                return Err(AppError::validation(format!(
                    "Only {} files are allowed",
                    self.allowed_extensions.join(", ").to_uppercase()
                )));
            }
        }

        if size == 0 {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        if size > self.max_bytes {
            return Err(AppError::payload_too_large(format!(
                "File size exceeds {}MB limit",
                self.max_bytes / (1024 * 1024)
            )));
        }

        Ok(())
    }
}

/// Result of an accepted upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    /// Identifier of the new job.
    pub file_id: JobId,
    /// Client-supplied file name.
    pub filename: String,
    /// Always `uploaded`.
    pub status: JobStatus,
    /// Human-readable message.
    pub message: String,
}
