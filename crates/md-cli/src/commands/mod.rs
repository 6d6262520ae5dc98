//! Command implementations.

pub mod arp;
pub mod diff;
pub mod export;
pub mod import;
pub mod schema;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

pub use arp::run_arp;
pub use diff::run_diff;
pub use export::run_export;
pub use import::{run_import_feed, run_import_json, run_import_xml};
pub use schema::run_schema;
pub use validate::run_validate;

use md_codec::MetadataImporter;
use md_core::{Config, Value};
use md_schema::SchemaRegistry;
use tracing::debug;

use crate::config::OutputFormat;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration.
    pub config: Config,
    /// Output format.
    pub output: OutputFormat,
}

impl Context {
    /// Creates a context.
    pub fn new(config: Config, output: OutputFormat) -> Self {
        Self { config, output }
    }

    /// Loads the schema registry from the configured directories.
    pub fn registry(&self) -> crate::CliResult<Arc<SchemaRegistry>> {
        debug!(
            schema_dir = %self.config.schema.schema_dir.display(),
            template_dir = %self.config.schema.template_dir.display(),
            "Loading schema registry"
        );
        let registry = SchemaRegistry::load(&self.config.schema.schema_dir, &self.config.schema.template_dir)?;
        Ok(Arc::new(registry))
    }

    /// Creates an importer over the configured schemas.
    pub fn importer(&self) -> crate::CliResult<MetadataImporter> {
        Ok(MetadataImporter::new(self.registry()?))
    }

    /// Returns true unless output is suppressed.
    pub fn verbose_output(&self) -> bool {
        self.output != OutputFormat::Quiet
    }
}

/// Reads and parses a JSON file.
pub fn read_json(path: &Path) -> crate::CliResult<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
