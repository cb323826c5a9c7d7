//! # docscrub-api
//!
//! HTTP API layer for DocScrub built on Axum.
//!
//! Provides the upload, processing, status, download, and diagnostics
//! endpoints, plus health, CORS, request logging, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
