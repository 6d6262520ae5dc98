//! # md-cli
//!
//! The `mdctl` command-line tool.
//!
//! This crate drives the metadata core from the shell:
//! - Schema validation and introspection
//! - SAML XML, aggregate feed and nested JSON import
//! - XML, nested and flat JSON export
//! - Push snapshot diffing
//! - Attribute release policy decoding and encoding

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use commands::Context;
pub use error::{CliError, CliResult};
