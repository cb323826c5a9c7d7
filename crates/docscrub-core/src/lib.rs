//! # docscrub-core
//!
//! Core crate for DocScrub. Contains configuration schemas, the job
//! identifier and status types, the collaborator traits (status store,
//! transformer, clock), and the unified error system.
//!
//! This crate has **no** internal dependencies on other DocScrub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
