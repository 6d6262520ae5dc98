//! Metadata document storage trait.

use async_trait::async_trait;
use md_model::MetaDataDocument;

use crate::error::StorageResult;

/// Provider for metadata document storage.
///
/// Documents live in one collection per stored type name, so live documents
/// (`saml20_sp`) and historical snapshots (`saml20_sp_revision`) never share
/// a key space. Implementations must be thread-safe and support concurrent
/// access.
#[async_trait]
pub trait MetaDataStore: Send + Sync {
    /// Gets a document by id.
    async fn find_by_id(&self, id: &str, entity_type: &str) -> StorageResult<Option<MetaDataDocument>>;

    /// Gets the live document carrying `entity_id`.
    async fn find_by_entity_id(&self, entity_id: &str, entity_type: &str) -> StorageResult<Option<MetaDataDocument>>;

    /// Lists the documents whose revision points at `parent_id`, newest
    /// revision first.
    async fn find_by_parent(&self, parent_id: &str, entity_type: &str) -> StorageResult<Vec<MetaDataDocument>>;

    /// Lists all documents of a type.
    async fn list(&self, entity_type: &str) -> StorageResult<Vec<MetaDataDocument>>;

    /// Inserts a new document and returns it as stored.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the id, or for live collections
    /// the entity id, is taken.
    async fn insert(&self, doc: &MetaDataDocument, entity_type: &str) -> StorageResult<MetaDataDocument>;

    /// Inserts or replaces a document and returns it as stored.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::VersionConflict` if the stored version differs
    /// from `doc.version`.
    async fn save(&self, doc: &MetaDataDocument, entity_type: &str) -> StorageResult<MetaDataDocument>;

    /// Removes a document. Returns false if it did not exist.
    async fn remove(&self, id: &str, entity_type: &str) -> StorageResult<bool>;

    /// Checks if a document exists.
    async fn exists(&self, id: &str, entity_type: &str) -> StorageResult<bool> {
        Ok(self.find_by_id(id, entity_type).await?.is_some())
    }
}
