//! ARP codec error types.

use thiserror::Error;

/// Result type for ARP operations.
pub type ArpResult<T> = Result<T, ArpError>;

/// A serialized policy that cannot be decoded.
///
/// Decoding never drops data silently, so every failure surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArpError {
    /// The serialization itself is broken.
    #[error("malformed ARP at byte {offset}: {message}")]
    Malformed {
        /// Byte offset where parsing stopped.
        offset: usize,
        /// What the parser expected.
        message: String,
    },

    /// The serialization parses but is not shaped like a policy.
    #[error("unexpected ARP structure: {0}")]
    Structure(String),
}

impl ArpError {
    /// Creates a syntax error at `offset`.
    #[must_use]
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            message: message.into(),
        }
    }

    /// Creates a structure error.
    #[must_use]
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }

    /// Returns the byte offset of a syntax error.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::Malformed { offset, .. } => Some(*offset),
            Self::Structure(_) => None,
        }
    }
}
