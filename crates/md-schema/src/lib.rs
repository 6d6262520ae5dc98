//! # md-schema
//!
//! Schema registry for federation metadata entity types.
//!
//! The registry loads one JSON schema per entity type from a configuration
//! directory, merges optional `*.addendum.json` documents into it, compiles
//! it with a fixed set of custom format validators and keeps the raw schema
//! tree around for introspection by the metadata codec:
//!
//! - [`SchemaRegistry`] - loading, validation and lookup by type
//! - [`SchemaDescriptor`] - compiled schema, template, index hints and
//!   pattern-property multiplicities of one type
//! - [`merge`] - depth-first addendum merge
//! - [`formats`] - custom `format` validators

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod formats;
pub mod merge;
pub mod registry;

pub use descriptor::{IndexHint, PatternProperty, SchemaDescriptor};
pub use error::{SchemaError, SchemaResult, ValidationError};
pub use registry::SchemaRegistry;
