//! Metadata document domain model.
//!
//! A document wraps the canonical attribute map of one entity together with
//! its storage identity, optimistic-concurrency version, type name and
//! revision. The same type serves draft, latest and historical snapshots.

use md_core::{AttributeMap, AttributeMapExt};
use serde::{Deserialize, Serialize};

use crate::entity_type::{base_type_name, EntityType, REVISION_SUFFIX};
use crate::revision::{LifecycleState, Revision};

/// A stored metadata entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDataDocument {
    /// Storage identifier. Empty until the document is initialized.
    #[serde(default)]
    pub id: String,

    /// Optimistic-concurrency counter maintained by the store.
    #[serde(default)]
    pub version: u64,

    /// Stored type name (`saml20_sp`, or `saml20_sp_revision` when historical).
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Revision bookkeeping. Absent for entities inserted by external tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,

    /// Canonical attribute map.
    #[serde(default)]
    pub data: AttributeMap,
}

impl MetaDataDocument {
    /// Creates an uninitialized document of the given type.
    #[must_use]
    pub fn new(entity_type: EntityType, data: AttributeMap) -> Self {
        Self {
            id: String::new(),
            version: 0,
            entity_type: entity_type.as_str().to_string(),
            revision: None,
            data,
        }
    }

    /// Returns the stored type name without the revision suffix.
    #[must_use]
    pub fn base_type(&self) -> &str {
        base_type_name(&self.entity_type)
    }

    /// Returns the parsed entity type, if known.
    #[must_use]
    pub fn kind(&self) -> Option<EntityType> {
        EntityType::from_stored(&self.entity_type).map(|(t, _)| t)
    }

    /// Returns true when the type name carries the revision suffix.
    #[must_use]
    pub fn has_revision_type(&self) -> bool {
        self.entity_type.ends_with(REVISION_SUFFIX)
    }

    /// Returns the entity identifier from the data.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.data.entity_id()
    }

    /// Returns the lifecycle state. Documents without a revision are drafts.
    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.revision
            .as_ref()
            .map_or(LifecycleState::Draft, Revision::state)
    }

    /// Returns the revision number, if any.
    #[must_use]
    pub fn revision_number(&self) -> Option<u64> {
        self.revision.as_ref().map(|r| r.number)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn data() -> AttributeMap {
        json!({"entityid": "https://sp.example.org", "metaDataFields": {}})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn new_document_is_uninitialized_draft() {
        let doc = MetaDataDocument::new(EntityType::SamlSp, data());
        assert!(doc.id.is_empty());
        assert_eq!(doc.entity_type, "saml20_sp");
        assert_eq!(doc.lifecycle_state(), LifecycleState::Draft);
        assert_eq!(doc.entity_id(), Some("https://sp.example.org"));
        assert_eq!(doc.kind(), Some(EntityType::SamlSp));
    }

    #[test]
    fn historical_type_is_recognized() {
        let mut doc = MetaDataDocument::new(EntityType::SamlIdp, data());
        doc.entity_type = EntityType::SamlIdp.revision_type();
        assert!(doc.has_revision_type());
        assert_eq!(doc.base_type(), "saml20_idp");
        assert_eq!(doc.kind(), Some(EntityType::SamlIdp));
    }

    #[test]
    fn deserializes_without_revision() {
        let doc: MetaDataDocument = serde_json::from_value(json!({
            "id": "abc",
            "version": 4,
            "type": "oidc10_rp",
            "data": {"entityid": "rp"}
        }))
        .unwrap();
        assert!(doc.revision.is_none());
        assert_eq!(doc.version, 4);
        assert_eq!(doc.entity_id(), Some("rp"));
    }

    #[test]
    fn serializes_type_field_name() {
        let mut doc = MetaDataDocument::new(EntityType::SamlSp, data());
        doc.revision = Some(Revision::root("jdoe", Utc::now()));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "saml20_sp");
        assert_eq!(json["revision"]["number"], 0);
    }
}
