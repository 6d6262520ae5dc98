//! A single changed attribute between two push snapshots.

use std::cmp::Ordering;

use md_core::Value;
use serde::Serialize;

/// One attribute of one entity whose value differs across a push.
///
/// Identity is `(entity_id, attribute)`: two deltas for the same pair are
/// equal regardless of their values, so a set of deltas holds at most one
/// entry per changed attribute. A side where the attribute is absent holds
/// [`Value::Null`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    /// Entity identifier of the record.
    pub entity_id: String,
    /// Flat attribute key.
    pub attribute: String,
    /// Value before the push.
    pub pre_push_value: Value,
    /// Value after the push.
    pub post_push_value: Value,
}

impl Delta {
    /// Creates a delta.
    #[must_use]
    pub fn new(
        entity_id: impl Into<String>,
        attribute: impl Into<String>,
        pre_push_value: Value,
        post_push_value: Value,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            attribute: attribute.into(),
            pre_push_value,
            post_push_value,
        }
    }

    fn key(&self) -> (&str, &str) {
        (&self.entity_id, &self.attribute)
    }
}

impl PartialEq for Delta {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Delta {}

impl PartialOrd for Delta {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Delta {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
