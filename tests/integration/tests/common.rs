//! Common test utilities and fixtures.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use md_codec::{MetadataExporter, MetadataImporter};
use md_core::AttributeMap;
use md_model::EntityType;
use md_revision::{RevisionEngine, RevisionService};
use md_schema::SchemaRegistry;
use md_storage::{InMemoryStore, MetaDataStore};

pub const SCHEMAS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/schemas");
pub const TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/templates");

pub const SP_XML: &str = include_str!("../../fixtures/sp.xml");
pub const IDP_XML: &str = include_str!("../../fixtures/idp.xml");
pub const FEED_XML: &str = include_str!("../../fixtures/feed.xml");
pub const BROKEN_FEED_XML: &str = include_str!("../../fixtures/broken_feed.xml");

pub const ADMIN: &str = "admin@example.org";

/// Fixed instant used as both revision clock and export clock.
pub fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
}

/// Shared registry, codec and storage for one test.
pub struct TestEnv {
    /// Schemas and templates shipped in `config/`.
    pub registry: Arc<SchemaRegistry>,
    /// Importer over the registry.
    pub importer: MetadataImporter,
    /// Exporter with the default freshness window.
    pub exporter: MetadataExporter,
    /// Backing store, also usable as lock store.
    pub store: Arc<InMemoryStore>,
    /// Revision service over the store with a fixed clock.
    pub revisions: RevisionService,
}

impl TestEnv {
    /// Creates a new test environment.
    pub fn new() -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("md_revision=debug,md_lock=debug,md_codec=info")
            .with_test_writer()
            .try_init();

        let registry = Arc::new(SchemaRegistry::load(SCHEMAS, TEMPLATES)?);
        let store = Arc::new(InMemoryStore::new());
        let revisions = RevisionService::with_engine(
            Arc::clone(&store) as Arc<dyn MetaDataStore>,
            RevisionEngine::with_clock(clock),
        );
        Ok(Self {
            importer: MetadataImporter::new(Arc::clone(&registry)),
            registry,
            exporter: MetadataExporter::default(),
            store,
            revisions,
        })
    }

    /// Imports one entity from XML.
    pub fn import(&self, xml: &str, entity_type: EntityType) -> anyhow::Result<AttributeMap> {
        Ok(self.importer.import_xml(xml.as_bytes(), entity_type, None)?)
    }
}
