//! Job lifecycle machinery for DocScrub.
//!
//! This crate provides:
//! - A registry of jobs with a processing attempt in flight
//! - A status ledger with a filesystem fallback for unknown jobs
//! - A timeout-bound executor around the transformation collaborator
//! - An artifact reaper and the two cleanup mechanisms that drive it
//!   (the periodic sweep and per-job delayed deletion)
//! - Built-in transformers (external command, passthrough copy)

pub mod active;
pub mod cleanup;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod metrics;
pub mod scheduler;
pub mod transform;

pub use active::{ActiveJobGuard, ActiveJobs};
pub use cleanup::{ArtifactReaper, PurgeReport, SweepReport};
pub use error::JobError;
pub use executor::{ProcessedArtifact, TimeoutExecutor};
pub use ledger::{MemoryStatusStore, StatusLedger};
pub use metrics::{LifecycleMetrics, MetricsSnapshot};
pub use scheduler::CleanupScheduler;
