//! Artifact storage configuration.

use serde::{Deserialize, Serialize};

/// Where uploaded and transformed artifacts live, and what uploads are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding input artifacts.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Directory holding output artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// File extension used for both artifact kinds (without the dot).
    #[serde(default = "default_extension")]
    pub artifact_extension: String,
    /// Maximum upload size in bytes (default 50 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Accepted client file name extensions, compared case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
            artifact_extension: default_extension(),
            max_upload_size_bytes: default_max_upload(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_output_dir() -> String {
    "./outputs".to_string()
}

fn default_extension() -> String {
    "pdf".to_string()
}

fn default_max_upload() -> u64 {
    52_428_800 // 50 MB
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}
