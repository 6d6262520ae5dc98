//! # md-codec
//!
//! Bidirectional transform between federation metadata wire formats and the
//! canonical attribute map.
//!
//! - [`MetadataImporter`] - streaming SAML XML import (single descriptor or
//!   aggregate feed) and nested JSON import
//! - [`MetadataExporter`] - deterministic XML export and nested/flat map
//!   export
//! - [`scanner`] - the per-entity state machine that flattens repeated
//!   elements into `Name:index:Field` keys under the schema's multiplicity caps
//!
//! Repeated XML elements map to indexed keys:
//!
//! ```text
//! <md:AssertionConsumerService Binding="..." Location="..." index="0"/>
//!   -> AssertionConsumerService:0:Binding, AssertionConsumerService:0:Location,
//!      AssertionConsumerService:0:index
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aliases;
pub mod constants;
pub mod error;
pub mod exporter;
pub mod feed;
pub mod flatten;
pub mod importer;
pub mod scanner;
mod xml;

pub use error::{ExportError, ExportResult, ImportError, ImportResult};
pub use exporter::MetadataExporter;
pub use feed::{FeedEntities, FeedSummary};
pub use importer::MetadataImporter;
pub use scanner::{EntityScanner, RepeatCounter};
