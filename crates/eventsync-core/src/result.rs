//! Convenience result type alias for EventSync.

use crate::error::AppError;

/// A specialized `Result` type for EventSync operations.
///
/// Every collaborator trait and backend returns this type so that errors
/// can be propagated with `?` without per-crate conversions.
pub type AppResult<T> = Result<T, AppError>;
