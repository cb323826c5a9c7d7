//! # docscrub-service
//!
//! Orchestrates the job lifecycle: storing uploads, running the
//! timeout-bound transformation, answering status queries, and wiring both
//! cleanup mechanisms. The HTTP layer talks only to [`JobService`].
//!
//! Dependencies are injected at construction time through
//! [`JobServiceBuilder`], which falls back to the configured transformer,
//! the system clock, and an in-memory status store.

pub mod builder;
pub mod job;

pub use builder::JobServiceBuilder;
pub use job::{
    JobDiagnostics, JobService, JobStatusReport, OutputDownload, UploadPolicy, UploadReceipt,
};
