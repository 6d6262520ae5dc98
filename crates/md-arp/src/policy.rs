//! Attribute release policy model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source assumed when a value does not name one.
pub const DEFAULT_SOURCE: &str = "idp";

/// Value meaning "release any value".
pub const WILDCARD: &str = "*";

/// One permitted value of a released attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArpValue {
    /// Attribute source (`idp`, or the name of an attribute authority).
    pub source: String,
    /// Permitted value, or [`WILDCARD`].
    pub value: String,
}

impl ArpValue {
    /// Creates a value from an explicit source.
    #[must_use]
    pub fn new(source: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            value: value.into(),
        }
    }

    /// Releases any value from the identity provider.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::new(DEFAULT_SOURCE, WILDCARD)
    }
}

/// A serialized policy value as it appears on the wire.
///
/// Old-style policies list bare strings, new-style policies list records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArpEntry {
    /// Old style: the value itself.
    Bare(String),
    /// New style: a record with optional fields.
    Record {
        /// Explicit source, if present.
        source: Option<String>,
        /// Explicit value, if present.
        value: Option<String>,
    },
}

impl ArpEntry {
    /// Resolves defaults: missing or empty value becomes [`WILDCARD`],
    /// missing or empty source becomes [`DEFAULT_SOURCE`].
    #[must_use]
    pub fn normalize(self) -> ArpValue {
        let (source, value) = match self {
            Self::Bare(value) => (None, Some(value)),
            Self::Record { source, value } => (source, value),
        };
        ArpValue {
            source: non_empty(source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            value: non_empty(value).unwrap_or_else(|| WILDCARD.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Decoded attribute release policy.
///
/// A disabled policy has no attributes. An enabled policy without attributes
/// is valid and releases nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArpAttributes {
    /// Whether a policy is configured at all.
    pub enabled: bool,
    /// Released attributes and their permitted values.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<ArpValue>>,
}

impl ArpAttributes {
    /// No policy configured.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A policy that releases nothing.
    #[must_use]
    pub fn release_nothing() -> Self {
        Self {
            enabled: true,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds a permitted value, enabling the policy. Duplicates are ignored.
    pub fn allow(&mut self, attribute: impl Into<String>, value: ArpValue) {
        self.enabled = true;
        let values = self.attributes.entry(attribute.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Replaces the values of one attribute, enabling the policy. The list
    /// is stored as given, duplicates included.
    pub fn replace(&mut self, attribute: impl Into<String>, values: Vec<ArpValue>) {
        self.enabled = true;
        self.attributes.insert(attribute.into(), values);
    }

    /// Returns the permitted values of an attribute.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[ArpValue]> {
        self.attributes.get(attribute).map(Vec::as_slice)
    }

    /// Returns true if no attribute is released.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Converts to the canonical `{enabled, attributes}` object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Reads the canonical object, if well formed.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let parsed: Self = serde_json::from_value(value.clone()).ok()?;
        if parsed.enabled {
            Some(parsed)
        } else {
            Some(Self::disabled())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_entries_default_source_and_wildcard() {
        assert_eq!(ArpEntry::Bare(String::new()).normalize(), ArpValue::wildcard());
        assert_eq!(
            ArpEntry::Bare("student".into()).normalize(),
            ArpValue::new("idp", "student")
        );
    }

    #[test]
    fn record_entries_keep_explicit_fields() {
        let entry = ArpEntry::Record {
            source: Some("voot".into()),
            value: None,
        };
        assert_eq!(entry.normalize(), ArpValue::new("voot", "*"));
        let entry = ArpEntry::Record {
            source: None,
            value: Some("member".into()),
        };
        assert_eq!(entry.normalize(), ArpValue::new("idp", "member"));
    }

    #[test]
    fn allow_enables_and_deduplicates() {
        let mut arp = ArpAttributes::disabled();
        arp.allow("urn:mace:dir:attribute-def:mail", ArpValue::wildcard());
        arp.allow("urn:mace:dir:attribute-def:mail", ArpValue::wildcard());
        assert!(arp.enabled);
        assert_eq!(arp.values("urn:mace:dir:attribute-def:mail").unwrap().len(), 1);
    }

    #[test]
    fn canonical_object_shape() {
        let mut arp = ArpAttributes::release_nothing();
        assert_eq!(arp.to_value(), json!({"enabled": true, "attributes": {}}));
        arp.allow("mail", ArpValue::wildcard());
        assert_eq!(
            arp.to_value(),
            json!({"enabled": true, "attributes": {"mail": [{"source": "idp", "value": "*"}]}})
        );
        assert_eq!(ArpAttributes::from_value(&arp.to_value()), Some(arp));
    }

    #[test]
    fn disabled_object_drops_attributes() {
        let value = json!({"enabled": false, "attributes": {"mail": [{"source": "idp", "value": "*"}]}});
        assert_eq!(ArpAttributes::from_value(&value), Some(ArpAttributes::disabled()));
        assert_eq!(ArpAttributes::from_value(&json!("N;")), None);
    }
}
