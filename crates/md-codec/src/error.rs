//! Codec error types.

use md_arp::ArpError;
use md_schema::{SchemaError, ValidationError};
use thiserror::Error;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors raised while importing metadata.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The XML is not well formed. Ends a feed import.
    #[error("XML syntax error: {0}")]
    Xml(String),

    /// An entity descriptor carries no `entityID`.
    #[error("entity descriptor without entityID")]
    MissingEntityId,

    /// The descriptor lacks the role the import asked for.
    #[error("entity {entity_id} has no {role}")]
    MissingRole {
        /// Entity that was scanned.
        entity_id: String,
        /// Expected role element.
        role: &'static str,
    },

    /// The requested entity is not in the document.
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// The entity type has no XML representation.
    #[error("entity type {0} cannot be imported from XML")]
    UnsupportedType(String),

    /// The embedded attribute release policy does not decode.
    #[error("invalid attribute release policy of {entity_id}: {source}")]
    Arp {
        /// Entity carrying the policy.
        entity_id: String,
        /// Decoder failure.
        #[source]
        source: ArpError,
    },

    /// The JSON input is not shaped like a metadata document.
    #[error("invalid JSON document: {0}")]
    InvalidJson(String),

    /// Schema lookup or validation failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ImportError {
    /// Creates an XML syntax error.
    #[must_use]
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Returns true if the error is a broken document rather than a broken
    /// entity. Feed imports stop on these.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Xml(_))
    }

    /// Returns the schema violations if validation failed.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Schema(err) => err.as_validation(),
            _ => None,
        }
    }
}

/// Errors raised while exporting metadata.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The XML writer failed.
    #[error("XML write error: {0}")]
    Xml(String),

    /// The document has no entity identifier.
    #[error("document {0} has no entityid")]
    MissingEntityId(String),

    /// The entity type has no XML representation.
    #[error("entity type {0} cannot be exported to XML")]
    UnsupportedType(String),

    /// A key is used both as a value and as a group when nesting.
    #[error("key '{0}' is both a value and a group")]
    KeyConflict(String),

    /// The freshness window pushes `validUntil` past the last representable
    /// timestamp.
    #[error("validUntil for an export at {0} is out of range")]
    ValidityOutOfRange(String),
}

impl ExportError {
    /// Creates an XML writer error.
    #[must_use]
    pub fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_are_classified() {
        assert!(ImportError::xml("mismatched tag").is_syntax());
        assert!(!ImportError::MissingEntityId.is_syntax());
    }

    #[test]
    fn arp_error_keeps_source() {
        let err = ImportError::Arp {
            entity_id: "https://sp.example.org".into(),
            source: ArpError::malformed(3, "unexpected end of input"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("https://sp.example.org"));
    }
}
