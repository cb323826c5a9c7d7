//! # docscrub-storage
//!
//! Maps job identifiers to artifact locations and performs the artifact
//! I/O: writing inputs, idempotent deletion, directory listings with
//! modification times, and streaming reads for downloads.

pub mod local;
pub mod paths;

pub use local::{ArtifactEntry, ByteStream, LocalArtifactStore};
pub use paths::{ArtifactKind, ArtifactPaths};
