//! Deterministic job identifier to artifact location mapping.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use docscrub_core::config::StorageConfig;
use docscrub_core::error::{AppError, ErrorKind};
use docscrub_core::result::AppResult;
use docscrub_core::types::JobId;

/// Suffix appended to the job identifier for output artifacts.
const OUTPUT_SUFFIX: &str = "_cleaned";

/// The two artifact kinds a job owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The uploaded document.
    Input,
    /// The transformed document.
    Output,
}

impl ArtifactKind {
    /// Both kinds, in sweep order.
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Input, ArtifactKind::Output];

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Two flat directories, one file per job per artifact kind.
///
/// Input: `<upload_dir>/<id>.<ext>`. Output: `<output_dir>/<id>_cleaned.<ext>`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// Directory holding input artifacts.
    upload_dir: PathBuf,
    /// Directory holding output artifacts.
    output_dir: PathBuf,
    /// Extension shared by both artifact kinds.
    extension: String,
}

impl ArtifactPaths {
    /// Build the mapping from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.upload_dir, &config.output_dir, &config.artifact_extension)
    }

    /// Build the mapping from explicit directories.
    pub fn new(
        upload_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        extension: &str,
    ) -> Self {
        Self {
            upload_dir: upload_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Create both directories if they are missing. Safe to call repeatedly.
    pub async fn ensure_directories(&self) -> AppResult<()> {
        for dir in [&self.upload_dir, &self.output_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", dir.display()),
                    e,
                )
            })?;
        }
        info!(
            upload_dir = %self.upload_dir.display(),
            output_dir = %self.output_dir.display(),
            "Artifact directories ensured"
        );
        Ok(())
    }

    /// Location of the input artifact for `id`.
    pub fn input_path(&self, id: JobId) -> PathBuf {
        self.upload_dir.join(format!("{id}.{}", self.extension))
    }

    /// Location of the output artifact for `id`.
    pub fn output_path(&self, id: JobId) -> PathBuf {
        self.output_dir
            .join(format!("{id}{OUTPUT_SUFFIX}.{}", self.extension))
    }

    /// Location of the given artifact kind for `id`.
    pub fn path_for(&self, kind: ArtifactKind, id: JobId) -> PathBuf {
        match kind {
            ArtifactKind::Input => self.input_path(id),
            ArtifactKind::Output => self.output_path(id),
        }
    }

    /// Directory holding the given artifact kind.
    pub fn dir_for(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Input => &self.upload_dir,
            ArtifactKind::Output => &self.output_dir,
        }
    }

    /// Artifact extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Recover the job identifier from an artifact file name.
    ///
    /// Returns `None` for names that do not follow the artifact layout.
    pub fn job_id_from_file_name(&self, kind: ArtifactKind, file_name: &str) -> Option<JobId> {
        let stem = file_name.strip_suffix(&format!(".{}", self.extension))?;
        let stem = match kind {
            ArtifactKind::Input => stem,
            ArtifactKind::Output => stem.strip_suffix(OUTPUT_SUFFIX)?,
        };
        stem.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> ArtifactPaths {
        ArtifactPaths::new("/srv/uploads", "/srv/outputs", "pdf")
    }

    #[test]
    fn test_paths_are_deterministic_and_distinct() {
        let paths = paths();
        let id = JobId::new();

        assert_eq!(paths.input_path(id), paths.input_path(id));
        assert_ne!(paths.input_path(id), paths.output_path(id));
        assert_eq!(
            paths.input_path(id),
            PathBuf::from(format!("/srv/uploads/{id}.pdf"))
        );
        assert_eq!(
            paths.output_path(id),
            PathBuf::from(format!("/srv/outputs/{id}_cleaned.pdf"))
        );
    }

    #[test]
    fn test_distinct_ids_never_collide() {
        let paths = paths();
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(paths.input_path(a), paths.input_path(b));
        assert_ne!(paths.output_path(a), paths.output_path(b));
    }

    #[test]
    fn test_file_name_round_trip() {
        let paths = paths();
        let id = JobId::new();

        let input_name = format!("{id}.pdf");
        let output_name = format!("{id}_cleaned.pdf");
        assert_eq!(
            paths.job_id_from_file_name(ArtifactKind::Input, &input_name),
            Some(id)
        );
        assert_eq!(
            paths.job_id_from_file_name(ArtifactKind::Output, &output_name),
            Some(id)
        );
        assert_eq!(
            paths.job_id_from_file_name(ArtifactKind::Output, &input_name),
            None
        );
        assert_eq!(
            paths.job_id_from_file_name(ArtifactKind::Input, "notes.txt"),
            None
        );
    }

    #[test]
    fn test_extension_leading_dot_is_ignored() {
        let paths = ArtifactPaths::new("/a", "/b", ".pdf");
        assert_eq!(paths.extension(), "pdf");
    }

    #[tokio::test]
    async fn test_ensure_directories_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("in"), dir.path().join("out"), "pdf");

        paths.ensure_directories().await.unwrap();
        paths.ensure_directories().await.unwrap();

        assert!(dir.path().join("in").is_dir());
        assert!(dir.path().join("out").is_dir());
    }
}
