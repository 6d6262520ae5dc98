//! In-memory storage backend.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use md_model::{MetaDataDocument, REVISION_SUFFIX};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::lock::{LockRecord, LockStore};
use crate::store::MetaDataStore;

/// `(stored type name, document id)`
type DocumentKey = (String, String);

/// Process-local store for documents and lock records.
///
/// Reads are lock-free. Document writes are serialized so that the id and
/// entity id uniqueness checks and the version check happen atomically with
/// the write. Lock records are inserted through the map's entry API, which
/// makes `insert_if_absent` a single atomic step per name.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: DashMap<DocumentKey, MetaDataDocument>,
    locks: DashMap<String, LockRecord>,
    writes: Mutex<()>,
}

fn key(entity_type: &str, id: &str) -> DocumentKey {
    (entity_type.to_string(), id.to_string())
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored documents across all types.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn ensure_unique_entity_id(&self, doc: &MetaDataDocument, entity_type: &str) -> StorageResult<()> {
        if entity_type.ends_with(REVISION_SUFFIX) {
            return Ok(());
        }
        let Some(entity_id) = doc.entity_id() else {
            return Ok(());
        };
        let taken = self.documents.iter().any(|entry| {
            let (stored_type, id) = entry.key();
            stored_type == entity_type && *id != doc.id && entry.value().entity_id() == Some(entity_id)
        });
        if taken {
            return Err(StorageError::duplicate(entity_type, "entityid", entity_id));
        }
        Ok(())
    }

    fn insert_document(&self, doc: &MetaDataDocument, entity_type: &str) -> StorageResult<MetaDataDocument> {
        if doc.id.is_empty() {
            return Err(StorageError::InvalidData("document has no id".to_string()));
        }
        let _writes = self.writes.lock();
        let key = key(entity_type, &doc.id);
        if self.documents.contains_key(&key) {
            return Err(StorageError::duplicate(entity_type, "id", doc.id.clone()));
        }
        self.ensure_unique_entity_id(doc, entity_type)?;

        let mut stored = doc.clone();
        stored.version = 1;
        self.documents.insert(key, stored.clone());
        debug!(id = %stored.id, entity_type, "Document inserted");
        Ok(stored)
    }

    fn save_document(&self, doc: &MetaDataDocument, entity_type: &str) -> StorageResult<MetaDataDocument> {
        if doc.id.is_empty() {
            return Err(StorageError::InvalidData("document has no id".to_string()));
        }
        let _writes = self.writes.lock();
        let key = key(entity_type, &doc.id);
        let actual = self.documents.get(&key).map_or(0, |stored| stored.version);
        if actual != doc.version {
            return Err(StorageError::version_conflict(doc.id.clone(), doc.version, actual));
        }
        self.ensure_unique_entity_id(doc, entity_type)?;

        let mut stored = doc.clone();
        stored.version = actual + 1;
        self.documents.insert(key, stored.clone());
        debug!(id = %stored.id, entity_type, version = stored.version, "Document saved");
        Ok(stored)
    }
}

#[async_trait]
impl MetaDataStore for InMemoryStore {
    async fn find_by_id(&self, id: &str, entity_type: &str) -> StorageResult<Option<MetaDataDocument>> {
        Ok(self
            .documents
            .get(&key(entity_type, id))
            .map(|doc| doc.value().clone()))
    }

    async fn find_by_entity_id(&self, entity_id: &str, entity_type: &str) -> StorageResult<Option<MetaDataDocument>> {
        Ok(self
            .documents
            .iter()
            .find(|entry| entry.key().0 == entity_type && entry.value().entity_id() == Some(entity_id))
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_parent(&self, parent_id: &str, entity_type: &str) -> StorageResult<Vec<MetaDataDocument>> {
        let mut children: Vec<MetaDataDocument> = self
            .documents
            .iter()
            .filter(|entry| {
                entry.key().0 == entity_type
                    && entry
                        .value()
                        .revision
                        .as_ref()
                        .and_then(|revision| revision.parent_id.as_deref())
                        == Some(parent_id)
            })
            .map(|entry| entry.value().clone())
            .collect();
        children.sort_by(|a, b| b.revision_number().cmp(&a.revision_number()));
        Ok(children)
    }

    async fn list(&self, entity_type: &str) -> StorageResult<Vec<MetaDataDocument>> {
        let mut docs: Vec<MetaDataDocument> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == entity_type)
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    async fn insert(&self, doc: &MetaDataDocument, entity_type: &str) -> StorageResult<MetaDataDocument> {
        self.insert_document(doc, entity_type)
    }

    async fn save(&self, doc: &MetaDataDocument, entity_type: &str) -> StorageResult<MetaDataDocument> {
        self.save_document(doc, entity_type)
    }

    async fn remove(&self, id: &str, entity_type: &str) -> StorageResult<bool> {
        let _writes = self.writes.lock();
        let removed = self.documents.remove(&key(entity_type, id)).is_some();
        debug!(id, entity_type, removed, "Document removed");
        Ok(removed)
    }
}

#[async_trait]
impl LockStore for InMemoryStore {
    async fn insert_if_absent(&self, record: &LockRecord) -> StorageResult<bool> {
        let now = Utc::now();
        let inserted = match self.locks.entry(record.lock_name.clone()) {
            Entry::Occupied(mut held) if held.get().is_expired(now) => {
                debug!(lock_name = %record.lock_name, previous_owner = %held.get().owner_id, "Expired lock reclaimed");
                held.insert(record.clone());
                true
            }
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                true
            }
        };
        Ok(inserted)
    }

    async fn find(&self, lock_name: &str) -> StorageResult<Option<LockRecord>> {
        let now = Utc::now();
        Ok(self
            .locks
            .get(lock_name)
            .map(|record| record.value().clone())
            .filter(|record| !record.is_expired(now)))
    }

    async fn remove_owned(&self, lock_name: &str, owner_id: &str) -> StorageResult<bool> {
        Ok(self
            .locks
            .remove_if(lock_name, |_, record| record.owner_id == owner_id)
            .is_some())
    }

    async fn purge_expired(&self) -> StorageResult<usize> {
        let now = Utc::now();
        let expired: Vec<String> = self
            .locks
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();
        let purged = expired
            .iter()
            .filter(|name| {
                self.locks
                    .remove_if(name.as_str(), |_, record| record.is_expired(now))
                    .is_some()
            })
            .count();
        if purged > 0 {
            debug!(purged, "Expired locks purged");
        }
        Ok(purged)
    }
}
