//! Storage-backed revision workflow.
//!
//! Writing a new revision touches two documents: the historical snapshot in
//! the `_revision` collection and the promoted latest document in the live
//! collection. The store offers no cross-document transaction, so the
//! service orders the writes and compensates:
//!
//! 1. insert the snapshot (a unique new id, cannot conflict);
//! 2. save the latest document with its optimistic version;
//! 3. if step 2 fails, remove the snapshot again and return the error.
//!
//! A crash between steps 1 and 2 leaves an orphan snapshot whose revision
//! number equals the live one. It duplicates state that still exists and is
//! never mistaken for the live document.

use std::sync::Arc;

use md_core::event::{EventType, MetadataEvent};
use md_core::{AttributeMap, Value};
use md_model::{EntityType, MetaDataDocument};
use md_storage::{MetaDataStore, StorageError};
use tracing::{error, info};
use uuid::Uuid;

use crate::engine::RevisionEngine;
use crate::error::{RevisionError, RevisionResult};

/// Creates, updates and restores revisioned documents in a store.
#[derive(Clone)]
pub struct RevisionService {
    store: Arc<dyn MetaDataStore>,
    engine: RevisionEngine,
}

impl std::fmt::Debug for RevisionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

impl RevisionService {
    /// Creates a service over a store.
    #[must_use]
    pub fn new(store: Arc<dyn MetaDataStore>) -> Self {
        Self::with_engine(store, RevisionEngine::new())
    }

    /// Creates a service with a custom engine (for a fixed clock).
    #[must_use]
    pub fn with_engine(store: Arc<dyn MetaDataStore>, engine: RevisionEngine) -> Self {
        Self { store, engine }
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &RevisionEngine {
        &self.engine
    }

    /// Stores a new entity with its root revision.
    ///
    /// # Errors
    ///
    /// Returns a duplicate storage error if the entity id is taken.
    pub async fn create(
        &self,
        entity_type: EntityType,
        data: AttributeMap,
        actor: &str,
    ) -> RevisionResult<MetaDataDocument> {
        let mut doc = MetaDataDocument::new(entity_type, data);
        self.engine.initial(&mut doc, new_id(), actor)?;
        let stored = self.store.insert(&doc, entity_type.as_str()).await?;
        MetadataEvent::builder(EventType::EntityCreated)
            .entity(stored.id.clone(), entity_type.as_str())
            .actor(actor)
            .emit();
        Ok(stored)
    }

    /// Loads a live document, giving it a synthetic revision if it has none.
    ///
    /// # Errors
    ///
    /// Returns a not found storage error if the document does not exist.
    pub async fn load(&self, id: &str, entity_type: EntityType) -> RevisionResult<MetaDataDocument> {
        let mut doc = self
            .store
            .find_by_id(id, entity_type.as_str())
            .await?
            .ok_or_else(|| StorageError::not_found(entity_type.as_str(), id))?;
        self.engine.ensure_revision(&mut doc);
        Ok(doc)
    }

    /// Replaces the data of `current` and writes a new revision.
    ///
    /// `current` must be the document as last read; its version guards the
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::is_version_conflict`] errors untouched when
    /// someone else changed the document since it was read.
    pub async fn update(
        &self,
        current: MetaDataDocument,
        data: AttributeMap,
        actor: &str,
    ) -> RevisionResult<MetaDataDocument> {
        let mut latest = current;
        self.engine.ensure_revision(&mut latest);
        let mut snapshot = latest.clone();
        self.engine.revision(&mut snapshot, new_id())?;

        latest.data = data;
        self.engine.promote_to_latest(&mut latest, actor)?;

        let stored = self.write_pair(&snapshot, &latest).await?;
        MetadataEvent::builder(EventType::RevisionCreated)
            .entity(stored.id.clone(), stored.entity_type.clone())
            .actor(actor)
            .detail("revision", stored.revision_number().unwrap_or_default().to_string())
            .detail("snapshot", snapshot.id.clone())
            .emit();
        Ok(stored)
    }

    /// Applies dotted-path updates to a stored document and writes a new
    /// revision.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::InvalidPath`] before anything is written if
    /// a path does not resolve.
    pub async fn merge<'a>(
        &self,
        id: &str,
        entity_type: EntityType,
        updates: impl IntoIterator<Item = (&'a str, Value)>,
        actor: &str,
    ) -> RevisionResult<MetaDataDocument> {
        let current = self.load(id, entity_type).await?;
        let mut changed = current.clone();
        self.engine.merge(&mut changed, updates)?;
        self.update(current, changed.data, actor).await
    }

    /// Makes a historical snapshot the live document again.
    ///
    /// The document it replaces is itself snapshotted first, so restoring
    /// never loses a revision.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::NotHistorical`] if `snapshot_id` names a
    /// snapshot without parent, or a storage error if either document is
    /// missing.
    pub async fn restore(
        &self,
        snapshot_id: &str,
        entity_type: EntityType,
        actor: &str,
    ) -> RevisionResult<MetaDataDocument> {
        let revision_type = entity_type.revision_type();
        let mut restored = self
            .store
            .find_by_id(snapshot_id, &revision_type)
            .await?
            .ok_or_else(|| StorageError::not_found(revision_type.as_str(), snapshot_id))?;
        let parent_id = restored
            .revision
            .as_ref()
            .and_then(|revision| revision.parent_id.clone())
            .ok_or_else(|| RevisionError::NotHistorical(snapshot_id.to_string()))?;

        let replacing = self.load(&parent_id, entity_type).await?;
        let mut snapshot = replacing.clone();
        self.engine.revision(&mut snapshot, new_id())?;
        self.engine.restore(&mut restored, &replacing, actor)?;

        let stored = self.write_pair(&snapshot, &restored).await?;
        MetadataEvent::builder(EventType::RevisionRestored)
            .entity(stored.id.clone(), stored.entity_type.clone())
            .actor(actor)
            .detail("from", snapshot_id)
            .detail("revision", stored.revision_number().unwrap_or_default().to_string())
            .emit();
        Ok(stored)
    }

    /// Lists the snapshots of a live document, newest first.
    ///
    /// # Errors
    ///
    /// Returns storage errors unchanged.
    pub async fn history(&self, id: &str, entity_type: EntityType) -> RevisionResult<Vec<MetaDataDocument>> {
        Ok(self.store.find_by_parent(id, &entity_type.revision_type()).await?)
    }

    /// Removes a live document. Its snapshots stay.
    ///
    /// # Errors
    ///
    /// Returns a not found storage error if the document does not exist.
    pub async fn delete(&self, id: &str, entity_type: EntityType, actor: &str) -> RevisionResult<()> {
        if !self.store.remove(id, entity_type.as_str()).await? {
            return Err(StorageError::not_found(entity_type.as_str(), id).into());
        }
        MetadataEvent::builder(EventType::EntityDeleted)
            .entity(id, entity_type.as_str())
            .actor(actor)
            .emit();
        Ok(())
    }

    async fn write_pair(
        &self,
        snapshot: &MetaDataDocument,
        latest: &MetaDataDocument,
    ) -> RevisionResult<MetaDataDocument> {
        let snapshot = self.store.insert(snapshot, &snapshot.entity_type).await?;
        match self.store.save(latest, &latest.entity_type).await {
            Ok(stored) => {
                info!(
                    id = %stored.id,
                    snapshot_id = %snapshot.id,
                    revision = ?stored.revision_number(),
                    "Revision written"
                );
                Ok(stored)
            }
            Err(err) => {
                if let Err(cleanup) = self.store.remove(&snapshot.id, &snapshot.entity_type).await {
                    error!(
                        snapshot_id = %snapshot.id,
                        error = %cleanup,
                        "Failed to remove orphan snapshot"
                    );
                }
                error!(id = %latest.id, error = %err, "Revision write rolled back");
                Err(RevisionError::from(err))
            }
        }
    }
}
