//! Lock error types.

use std::time::Duration;

use md_storage::StorageError;
use thiserror::Error;

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

/// Errors raised by the cluster lock.
///
/// A lock held by someone else is not an error; it is reported as `false`
/// or as a skipped job.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lease length does not fit a timestamp.
    #[error("lease of {0:?} is out of range")]
    InvalidTtl(Duration),

    /// The lock store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LockError {
    /// Returns true if trying again later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_retryable())
    }
}
