//! Schema registry error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised by the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema or template files are missing or malformed. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No schema is registered for the requested type.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// A document violates its schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SchemaError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns the validation details if this is a validation failure.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Checks if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Schema violations of one document.
///
/// Carries every violated constraint, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Entity type the document was validated as.
    pub entity_type: String,
    /// Location of the schema the document was validated against.
    pub schema_path: PathBuf,
    /// One message per violation, prefixed with the instance path.
    pub messages: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} violation(s) of {} schema {}: {}",
            self.messages.len(),
            self.entity_type,
            self.schema_path.display(),
            self.messages.join("; ")
        )
    }
}

impl std::error::Error for ValidationError {}
