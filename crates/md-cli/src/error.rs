//! CLI error types.

use md_arp::ArpError;
use md_codec::{ExportError, ImportError};
use md_core::ConfigError;
use md_push::PushError;
use md_schema::SchemaError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schema registry error, including validation failures.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Import error.
    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    /// Export error.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// Attribute release policy error.
    #[error("ARP error: {0}")]
    Arp(#[from] ArpError),

    /// Push diff error.
    #[error("diff failed: {0}")]
    Push(#[from] PushError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
