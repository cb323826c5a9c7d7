//! Convenience result type alias for DocScrub.

use crate::error::AppError;

/// A specialized `Result` type for DocScrub operations.
pub type AppResult<T> = Result<T, AppError>;
