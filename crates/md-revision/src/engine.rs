//! Revision state transitions.
//!
//! A document moves from draft (number 0, no parent) to latest (number > 0)
//! and is eventually frozen into a historical snapshot stored under a new id
//! in the `_revision` collection of its type. The engine only rewrites the
//! in-memory document; persisting the results is up to the caller (see
//! [`crate::RevisionService`]).

use chrono::{DateTime, Utc};
use md_core::{AttributeMap, Value};
use md_model::{MetaDataDocument, Revision, REVISION_SUFFIX, SYSTEM_ACTOR};
use tracing::{debug, info};

use crate::error::{RevisionError, RevisionResult};

/// Source of revision timestamps.
pub type Clock = fn() -> DateTime<Utc>;

/// Separator of merge path segments.
const PATH_SEPARATOR: char = '.';

/// Applies revision transitions to documents.
#[derive(Debug, Clone, Copy)]
pub struct RevisionEngine {
    clock: Clock,
}

impl Default for RevisionEngine {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl RevisionEngine {
    /// Creates an engine on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom clock.
    #[must_use]
    pub const fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Gives a fresh document its id and root revision.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::AlreadyInitialized`] if the document already
    /// has an id or a revision.
    pub fn initial(&self, doc: &mut MetaDataDocument, id: impl Into<String>, actor: &str) -> RevisionResult<()> {
        if !doc.id.is_empty() || doc.revision.is_some() {
            return Err(RevisionError::AlreadyInitialized(doc.id.clone()));
        }
        doc.id = id.into();
        doc.revision = Some(Revision::root(actor, self.now()));
        debug!(id = %doc.id, entity_type = %doc.entity_type, actor, "Document initialized");
        Ok(())
    }

    /// Gives a document without revision a synthetic root revision.
    ///
    /// Documents written by external tools carry no revision; they are
    /// treated as drafts attributed to the system actor. Returns true if a
    /// revision was added.
    pub fn ensure_revision(&self, doc: &mut MetaDataDocument) -> bool {
        if doc.revision.is_some() {
            return false;
        }
        doc.revision = Some(Revision::root(SYSTEM_ACTOR, self.now()));
        info!(id = %doc.id, entity_type = %doc.entity_type, "Materialized missing revision");
        true
    }

    /// Bumps the revision of a changed document.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::AlreadyHistorical`] for snapshots.
    pub fn promote_to_latest(&self, doc: &mut MetaDataDocument, actor: &str) -> RevisionResult<()> {
        if doc.has_revision_type() {
            return Err(RevisionError::AlreadyHistorical(doc.id.clone()));
        }
        self.ensure_revision(doc);
        let next = doc
            .revision
            .as_ref()
            .map(|previous| Revision::successor(previous, actor, self.now()));
        doc.revision = next;
        debug!(id = %doc.id, revision = ?doc.revision_number(), actor, "Promoted to latest");
        Ok(())
    }

    /// Turns the in-memory copy of a live document into its historical
    /// snapshot under `new_id`.
    ///
    /// The type gains the revision suffix, the revision is terminated and
    /// points back at the id the document had.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::AlreadyHistorical`] for snapshots.
    pub fn revision(&self, doc: &mut MetaDataDocument, new_id: impl Into<String>) -> RevisionResult<()> {
        if doc.has_revision_type() {
            return Err(RevisionError::AlreadyHistorical(doc.id.clone()));
        }
        self.ensure_revision(doc);
        let now = self.now();
        let new_id = new_id.into();
        if let Some(revision) = doc.revision.as_mut() {
            revision.parent_id = Some(doc.id.clone());
            revision.terminated = Some(now);
        }
        doc.entity_type.push_str(REVISION_SUFFIX);
        info!(parent_id = %doc.id, snapshot_id = %new_id, revision = ?doc.revision_number(), "Snapshot taken");
        doc.id = new_id;
        Ok(())
    }

    /// Reinstates a historical snapshot as the live document it was taken
    /// from.
    ///
    /// The snapshot takes over the id, storage version and type of
    /// `replacing`, gets the next revision number and points its parent at
    /// the record it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::NotHistorical`] if `snapshot` is live.
    pub fn restore(
        &self,
        snapshot: &mut MetaDataDocument,
        replacing: &MetaDataDocument,
        actor: &str,
    ) -> RevisionResult<()> {
        if !snapshot.has_revision_type() {
            return Err(RevisionError::NotHistorical(snapshot.id.clone()));
        }
        let number = replacing.revision_number().unwrap_or(0) + 1;
        snapshot.id = replacing.id.clone();
        snapshot.version = replacing.version;
        snapshot.entity_type = replacing.base_type().to_string();
        snapshot.revision = Some(Revision {
            number,
            created: self.now(),
            parent_id: Some(replacing.id.clone()),
            updated_by: actor.to_string(),
            terminated: None,
        });
        info!(id = %snapshot.id, revision = number, actor, "Revision restored");
        Ok(())
    }

    /// Applies dotted-path updates to the document data.
    ///
    /// Every segment but the last must name an existing nested map. A null
    /// value removes the leaf. Either all updates apply or none does.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::InvalidPath`] naming the first segment that
    /// does not resolve to a map.
    pub fn merge<'a>(
        &self,
        doc: &mut MetaDataDocument,
        updates: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> RevisionResult<()> {
        let mut data = doc.data.clone();
        for (path, value) in updates {
            merge_path(&mut data, path, value)?;
        }
        doc.data = data;
        Ok(())
    }
}

fn merge_path(data: &mut AttributeMap, path: &str, value: Value) -> RevisionResult<()> {
    let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    let Some(leaf) = segments.pop().filter(|leaf| !leaf.is_empty()) else {
        return Err(RevisionError::invalid_path(path, path));
    };
    let mut node = data;
    for segment in segments {
        node = match node.get_mut(segment) {
            Some(Value::Object(child)) => child,
            _ => return Err(RevisionError::invalid_path(path, segment)),
        };
    }
    if value.is_null() {
        node.remove(leaf);
    } else {
        node.insert(leaf.to_string(), value);
    }
    Ok(())
}
