//! # md-core
//!
//! Core utilities, configuration, and error handling for the federation
//! metadata core.
//!
//! This crate provides foundational types used across all other `md-*`
//! crates:
//!
//! - [`Config`] - TOML/environment configuration
//! - [`AttributeMap`] - the canonical, ordered attribute map and its accessors
//! - [`event`] - audit events emitted through `tracing`

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod attributes;
pub mod config;
pub mod error;
pub mod event;

pub use attributes::{values_equivalent, AttributeMap, AttributeMapExt, ARP, ENTITY_ID, METADATA_FIELDS};
pub use config::Config;
pub use error::{ConfigError, ConfigResult};
pub use serde_json::Value;
