//! Canonical attribute map.
//!
//! The canonical map is the pivot format between XML, JSON and storage. It is
//! an insertion-ordered string-keyed map of JSON values. Top-level keys hold
//! entity-wide data (`entityid`, `state`, `arp`, ...); the
//! [`METADATA_FIELDS`] object holds the colon-delimited metadata fields
//! (`AssertionConsumerService:0:Binding`, `name:en`).

use serde_json::{Map, Value};

/// Ordered string-keyed map of dynamically typed values.
pub type AttributeMap = Map<String, Value>;

/// Key of the nested object holding colon-delimited metadata fields.
pub const METADATA_FIELDS: &str = "metaDataFields";

/// Key of the entity identifier.
pub const ENTITY_ID: &str = "entityid";

/// Key of the attribute release policy object.
pub const ARP: &str = "arp";

/// Typed accessors over an [`AttributeMap`].
pub trait AttributeMapExt {
    /// Returns the value at `key` if it is a string.
    fn str_value(&self, key: &str) -> Option<&str>;

    /// Returns the value at `key` if it is a boolean.
    fn bool_value(&self, key: &str) -> Option<bool>;

    /// Returns the value at `key` if it is a nested map.
    fn map_value(&self, key: &str) -> Option<&AttributeMap>;

    /// Returns the value at `key` mutably if it is a nested map.
    fn map_value_mut(&mut self, key: &str) -> Option<&mut AttributeMap>;

    /// Returns the nested map at `key`, inserting an empty one when absent
    /// or when the current value is not a map.
    fn map_entry(&mut self, key: &str) -> &mut AttributeMap;

    /// Returns the entity identifier.
    fn entity_id(&self) -> Option<&str> {
        self.str_value(ENTITY_ID)
    }

    /// Returns the metadata fields object.
    fn metadata_fields(&self) -> Option<&AttributeMap> {
        self.map_value(METADATA_FIELDS)
    }

    /// Returns a metadata field as a string.
    fn field(&self, key: &str) -> Option<&str> {
        self.metadata_fields()
            .and_then(|fields| fields.get(key))
            .and_then(Value::as_str)
    }
}

impl AttributeMapExt for AttributeMap {
    fn str_value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn bool_value(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    fn map_value(&self, key: &str) -> Option<&AttributeMap> {
        self.get(key).and_then(Value::as_object)
    }

    fn map_value_mut(&mut self, key: &str) -> Option<&mut AttributeMap> {
        self.get_mut(key).and_then(Value::as_object_mut)
    }

    fn map_entry(&mut self, key: &str) -> &mut AttributeMap {
        let slot = self
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just replaced by an object"),
        }
    }
}

/// Compares two values, treating strings that differ only in surrounding
/// whitespace as equal and numbers by value (`1` equals `1.0`).
#[must_use]
pub fn values_equivalent(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a.trim() == b.trim(),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> AttributeMap {
        match json!({
            "entityid": "https://sp.example.org",
            "active": true,
            "metaDataFields": {"name:en": "Example SP"}
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn typed_accessors() {
        let map = sample();
        assert_eq!(map.entity_id(), Some("https://sp.example.org"));
        assert_eq!(map.bool_value("active"), Some(true));
        assert_eq!(map.field("name:en"), Some("Example SP"));
        assert_eq!(map.str_value("active"), None);
        assert!(map.map_value("entityid").is_none());
    }

    #[test]
    fn map_entry_creates_and_replaces() {
        let mut map = sample();
        map.map_entry("arp").insert("enabled".into(), json!(false));
        assert_eq!(map.map_value("arp").unwrap().bool_value("enabled"), Some(false));

        map.map_entry("entityid").insert("x".into(), json!(1));
        assert!(map.get("entityid").unwrap().is_object());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = AttributeMap::new();
        map.insert("zeta".into(), json!(1));
        map.insert("alpha".into(), json!(2));
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn whitespace_only_string_differences_are_equivalent() {
        assert!(values_equivalent(&json!(" a "), &json!("a")));
        assert!(!values_equivalent(&json!("a"), &json!("b")));
        assert!(values_equivalent(&json!(1), &json!(1)));
        assert!(!values_equivalent(&json!("1"), &json!(1)));
        assert!(values_equivalent(&Value::Null, &Value::Null));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(values_equivalent(&json!(1), &json!(1.0)));
        assert!(values_equivalent(&json!(-3), &json!(-3)));
        assert!(!values_equivalent(&json!(1), &json!(1.5)));
        assert!(!values_equivalent(&json!(2), &json!(3)));
    }
}
