//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Document not found.
    #[error("Document not found: {entity_type} with id {id}")]
    NotFound {
        /// Stored type name.
        entity_type: String,
        /// Document id.
        id: String,
    },

    /// Duplicate document (unique key violation).
    #[error("Duplicate {entity_type}: {field} '{value}' already exists")]
    Duplicate {
        /// Stored type name.
        entity_type: String,
        /// Field that caused the conflict.
        field: &'static str,
        /// Conflicting value.
        value: String,
    },

    /// The stored version moved on since the document was read.
    #[error("Version conflict on {id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Document id.
        id: String,
        /// Version the caller read.
        expected: u64,
        /// Version in the store.
        actual: u64,
    },

    /// Invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Internal error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: impl Into<String>, field: &'static str, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field,
            value: value.into(),
        }
    }

    /// Creates a version conflict error.
    #[must_use]
    pub fn version_conflict(id: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::VersionConflict {
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Checks if this is a duplicate error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Checks if this is a version conflict.
    #[must_use]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Returns true if re-reading the document and retrying may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.is_version_conflict()
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
