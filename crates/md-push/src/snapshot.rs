//! Flat attribute records bracketing one push.

use md_codec::{ExportError, MetadataExporter};
use md_core::{AttributeMap, AttributeMapExt, Value, ENTITY_ID};
use md_model::MetaDataDocument;

use crate::error::{PushError, PushResult};

/// Key of the correlation id in raw records.
pub const ENTITY_ID_KEY: &str = "entity_id";

/// Key of the stored type in raw and exported records.
pub const TYPE_KEY: &str = "type";

/// One entity as seen by the downstream consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct PushRecord {
    /// Correlation id.
    pub entity_id: String,
    /// Base entity type.
    pub entity_type: String,
    /// Flat attributes, nested paths joined with `.`.
    pub attributes: AttributeMap,
}

impl PushRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(entity_id: impl Into<String>, entity_type: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_type: entity_type.into(),
            attributes,
        }
    }

    /// Flattens a stored document the way it is pushed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingEntityId`] for documents without an
    /// entity id.
    pub fn from_document(exporter: &MetadataExporter, doc: &MetaDataDocument) -> PushResult<Self> {
        let entity_id = doc
            .entity_id()
            .ok_or_else(|| ExportError::MissingEntityId(doc.id.clone()))?;
        let attributes = exporter.export_to_map(doc, true)?;
        Ok(Self::new(entity_id, doc.base_type(), attributes))
    }

    /// Reads a raw record carrying `entity_id` (or `entityid`) and `type`.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::MissingKey`] if either key is absent.
    pub fn from_map(attributes: AttributeMap, index: usize) -> PushResult<Self> {
        let entity_id = attributes
            .str_value(ENTITY_ID_KEY)
            .or_else(|| attributes.str_value(ENTITY_ID))
            .ok_or(PushError::MissingKey { key: ENTITY_ID_KEY, index })?
            .to_string();
        let entity_type = attributes
            .str_value(TYPE_KEY)
            .ok_or(PushError::MissingKey { key: TYPE_KEY, index })?
            .to_string();
        Ok(Self::new(entity_id, entity_type, attributes))
    }

    /// Returns true if both records describe the same entity.
    #[must_use]
    pub fn correlates(&self, other: &Self) -> bool {
        self.entity_id == other.entity_id && self.entity_type == other.entity_type
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }
}

/// All records pushed at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushSnapshot {
    records: Vec<PushRecord>,
}

impl PushSnapshot {
    /// Creates a snapshot from records.
    #[must_use]
    pub fn new(records: Vec<PushRecord>) -> Self {
        Self { records }
    }

    /// Flattens every document that has an entity id.
    ///
    /// # Errors
    ///
    /// Returns the first export failure.
    pub fn from_documents<'a>(
        exporter: &MetadataExporter,
        docs: impl IntoIterator<Item = &'a MetaDataDocument>,
    ) -> PushResult<Self> {
        let records = docs
            .into_iter()
            .map(|doc| PushRecord::from_document(exporter, doc))
            .collect::<PushResult<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    /// Reads raw records, for example a JSON array written by the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::MissingKey`] for the first record lacking a
    /// correlation key.
    pub fn from_maps(maps: impl IntoIterator<Item = AttributeMap>) -> PushResult<Self> {
        let records = maps
            .into_iter()
            .enumerate()
            .map(|(index, map)| PushRecord::from_map(map, index))
            .collect::<PushResult<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    /// Returns the records.
    #[must_use]
    pub fn records(&self) -> &[PushRecord] {
        &self.records
    }

    /// Returns the record describing the same entity as `record`.
    #[must_use]
    pub fn find(&self, record: &PushRecord) -> Option<&PushRecord> {
        self.records.iter().find(|candidate| candidate.correlates(record))
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<PushRecord> for PushSnapshot {
    fn from_iter<I: IntoIterator<Item = PushRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
