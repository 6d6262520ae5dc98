//! Revision error types.

use md_storage::StorageError;
use thiserror::Error;

/// Result type for revision operations.
pub type RevisionResult<T> = Result<T, RevisionError>;

/// Errors raised by revision transitions and the revision service.
#[derive(Debug, Error)]
pub enum RevisionError {
    /// A merge path crosses a value that is not a nested map.
    #[error("invalid path '{path}': segment '{segment}' is not a nested map")]
    InvalidPath {
        /// Full dotted path.
        path: String,
        /// First segment that did not resolve.
        segment: String,
    },

    /// `initial` was called on a document that already has an identity.
    #[error("document {0} is already initialized")]
    AlreadyInitialized(String),

    /// The transition requires a historical snapshot.
    #[error("document {0} is not a historical revision")]
    NotHistorical(String),

    /// The transition requires a live document.
    #[error("document {0} is already historical")]
    AlreadyHistorical(String),

    /// The persistence layer failed. Version conflicts pass through
    /// unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RevisionError {
    /// Creates an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            segment: segment.into(),
        }
    }

    /// Returns true if the caller should reload the document and retry.
    #[must_use]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_version_conflict())
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_not_found())
    }
}
