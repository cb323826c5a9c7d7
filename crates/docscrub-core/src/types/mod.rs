//! Shared domain types.

pub mod id;
pub mod status;

pub use id::JobId;
pub use status::JobStatus;
