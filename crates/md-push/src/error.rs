//! Push error types.

use md_codec::ExportError;
use thiserror::Error;

/// Result type for push operations.
pub type PushResult<T> = Result<T, PushError>;

/// Errors raised while building snapshots or delivering deltas.
#[derive(Debug, Error)]
pub enum PushError {
    /// A document could not be exported into a flat record.
    #[error("snapshot export failed: {0}")]
    Export(#[from] ExportError),

    /// A raw record lacks one of its correlation keys.
    #[error("record {index} has no '{key}' value")]
    MissingKey {
        /// Name of the missing key.
        key: &'static str,
        /// Position of the record in its snapshot.
        index: usize,
    },

    /// The notification sink rejected the delta set.
    #[error("notification failed: {0}")]
    Notification(String),
}

impl PushError {
    /// Creates a notification error.
    #[must_use]
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(message.into())
    }

    /// Returns true if delivery failed after the diff was computed.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        matches!(self, Self::Notification(_))
    }
}
