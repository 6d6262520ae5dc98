//! Configuration error handling.
//!
//! Configuration errors are fatal at startup; they carry enough context
//! (the offending file or variable) to be fixed by an operator.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the configuration error type.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::Config`].
    #[error("failed to parse configuration file {path}: {message}")]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An environment variable holds a value of the wrong shape.
    #[error("invalid value for environment variable {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// A setting parses but lies outside its accepted range.
    #[error("configuration value {key} = {value} is out of range")]
    OutOfRange {
        /// Dotted setting name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    /// Creates an invalid environment variable error.
    #[must_use]
    pub fn invalid_env(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnv {
            name,
            value: value.into(),
        }
    }

    /// Creates an out of range error.
    #[must_use]
    pub fn out_of_range(key: &'static str, value: impl ToString) -> Self {
        Self::OutOfRange {
            key,
            value: value.to_string(),
        }
    }
}
