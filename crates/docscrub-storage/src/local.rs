//! Local filesystem artifact store.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::SystemTime;

use bytes::Bytes;
use futures::Stream;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use docscrub_core::error::{AppError, ErrorKind};
use docscrub_core::result::AppResult;
use docscrub_core::types::JobId;

use crate::paths::{ArtifactKind, ArtifactPaths};

/// A byte stream used for streaming artifact downloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// One entry found while listing an artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Artifact kind of the directory it was found in.
    pub kind: ArtifactKind,
    /// Job the entry belongs to, if the name follows the artifact layout.
    pub job_id: Option<JobId>,
    /// Last modification time, if it could be read.
    pub modified: Option<SystemTime>,
}

/// Reads, writes, and deletes job artifacts on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    /// Location mapping.
    paths: ArtifactPaths,
}

impl LocalArtifactStore {
    /// Create a store over the given location mapping.
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    /// The location mapping.
    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Write the input artifact for `id` and flush it to disk.
    pub async fn write_input(&self, id: JobId, data: Bytes) -> AppResult<PathBuf> {
        let path = self.paths.input_path(id);

        let mut file = fs::File::create(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create input file: {}", path.display()),
                e,
            )
        })?;
        file.write_all(&data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to write input file", e)
        })?;
        file.sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to sync input file", e))?;

        debug!(job_id = %id, path = %path.display(), bytes = data.len(), "Wrote input artifact");
        Ok(path)
    }

    /// Delete a file. Returns `Ok(false)` when it was already absent.
    pub async fn remove(&self, path: &Path) -> AppResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {}", path.display()),
                e,
            )),
        }
    }

    /// Whether a file exists at `path`.
    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Size in bytes of the file at `path`, or `None` if it is absent.
    pub async fn size(&self, path: &Path) -> Option<u64> {
        fs::metadata(path).await.ok().map(|m| m.len())
    }

    /// Last modification time of the file at `path`, or `None` if it is absent.
    pub async fn modified(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).await.ok().and_then(|m| m.modified().ok())
    }

    /// List every entry of one artifact directory.
    ///
    /// Fails only if the directory itself cannot be read. Entries whose
    /// metadata cannot be read are returned with `modified: None`.
    pub async fn list(&self, kind: ArtifactKind) -> AppResult<Vec<ArtifactEntry>> {
        let dir = self.paths.dir_for(kind);
        let mut read_dir = fs::read_dir(dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list directory: {}", dir.display()),
                e,
            )
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().to_string();
            let modified = match entry.metadata().await {
                Ok(meta) => meta.modified().ok(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read entry metadata");
                    None
                }
            };

            entries.push(ArtifactEntry {
                job_id: self.paths.job_id_from_file_name(kind, &file_name),
                path,
                kind,
                modified,
            });
        }

        Ok(entries)
    }

    /// Open a file for streaming.
    ///
    /// The file handle is acquired before the stream is returned, so a
    /// concurrent unlink on Unix does not interrupt the read.
    pub async fn open(&self, path: &Path) -> AppResult<ByteStream> {
        let file = fs::File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {}", path.display()))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open file: {}", path.display()),
                    e,
                )
            }
        })?;

        Ok(Box::pin(ReaderStream::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn store() -> (tempfile::TempDir, LocalArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("uploads"), dir.path().join("outputs"), "pdf");
        paths.ensure_directories().await.unwrap();
        (dir, LocalArtifactStore::new(paths))
    }

    #[tokio::test]
    async fn test_write_then_remove_is_idempotent() {
        let (_dir, store) = store().await;
        let id = JobId::new();

        let path = store.write_input(id, Bytes::from("%PDF-1.7")).await.unwrap();
        assert!(store.exists(&path).await);
        assert_eq!(store.size(&path).await, Some(8));

        assert!(store.remove(&path).await.unwrap());
        assert!(!store.remove(&path).await.unwrap());
        assert!(!store.exists(&path).await);
    }

    #[tokio::test]
    async fn test_list_reports_job_ids_and_strays() {
        let (_dir, store) = store().await;
        let id = JobId::new();
        store.write_input(id, Bytes::from("doc")).await.unwrap();
        tokio::fs::write(store.paths().dir_for(ArtifactKind::Input).join("stray.tmp"), b"x")
            .await
            .unwrap();

        let mut entries = store.list(ArtifactKind::Input).await.unwrap();
        entries.sort_by_key(|e| e.job_id.is_none());

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].job_id, Some(id));
        assert!(entries[0].modified.is_some());
        assert_eq!(entries[1].job_id, None);
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let store = LocalArtifactStore::new(ArtifactPaths::new(
            "/nonexistent/docscrub/in",
            "/nonexistent/docscrub/out",
            "pdf",
        ));
        assert!(store.list(ArtifactKind::Output).await.is_err());
    }

    #[tokio::test]
    async fn test_open_streams_content() {
        let (_dir, store) = store().await;
        let id = JobId::new();
        let path = store.write_input(id, Bytes::from("hello world")).await.unwrap();

        let mut stream = store.open(&path).await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"hello world");
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let (_dir, store) = store().await;
        let path = store.paths().output_path(JobId::new());
        let err = store.open(&path).await.err().unwrap();
        assert!(err.is_not_found());
    }
}
