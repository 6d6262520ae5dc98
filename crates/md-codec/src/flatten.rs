//! Conversions between colon-keyed, nested and dotted attribute maps.

use std::collections::BTreeMap;

use md_core::{AttributeMap, Value};

use crate::error::{ExportError, ExportResult};

/// Separator of metadata field key segments.
pub const FIELD_SEPARATOR: char = ':';

/// Separator of nested object paths in flat exports.
pub const PATH_SEPARATOR: char = '.';

/// Collapses a nested metadata fields tree into colon-delimited keys.
///
/// Non-object values (including arrays) are leaves. Keys that are already
/// colon-delimited pass through unchanged.
#[must_use]
pub fn flatten_fields(nested: &AttributeMap) -> AttributeMap {
    let mut flat = AttributeMap::new();
    collect(&mut flat, None, nested, FIELD_SEPARATOR);
    flat
}

fn collect(out: &mut AttributeMap, prefix: Option<&str>, map: &AttributeMap, separator: char) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{separator}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) if !child.is_empty() => collect(out, Some(&path), child, separator),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Groups colon-delimited keys into a tree with sorted keys.
///
/// # Errors
///
/// Returns [`ExportError::KeyConflict`] when a key is both a value and the
/// prefix of another key (`a` and `a:b`).
pub fn nest_fields(flat: &AttributeMap) -> ExportResult<AttributeMap> {
    let sorted: BTreeMap<&String, &Value> = flat.iter().collect();
    let mut root = AttributeMap::new();
    for (key, value) in sorted {
        let segments: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ExportError::KeyConflict(key.clone()))?;
        let mut node = &mut root;
        for segment in parents {
            let slot = node
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(AttributeMap::new()));
            node = match slot {
                Value::Object(child) => child,
                _ => return Err(ExportError::KeyConflict(key.clone())),
            };
        }
        if node.contains_key(*last) {
            return Err(ExportError::KeyConflict(key.clone()));
        }
        node.insert((*last).to_string(), value.clone());
    }
    Ok(root)
}

/// Returns a copy of `value` with every object's keys in sorted order.
#[must_use]
pub fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, &Value> = map.iter().collect();
            Value::Object(
                ordered
                    .into_iter()
                    .map(|(key, child)| (key.clone(), sorted(child)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Flattens nested objects into dotted keys in sorted order. Arrays and
/// empty objects are leaves.
#[must_use]
pub fn flatten_dotted(map: &AttributeMap) -> AttributeMap {
    let mut flat = AttributeMap::new();
    collect(&mut flat, None, map, PATH_SEPARATOR);
    let ordered: BTreeMap<String, Value> = flat.into_iter().collect();
    ordered.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn nest_groups_indexed_and_localized_keys() {
        let flat = object(json!({
            "name:en": "Example",
            "AssertionConsumerService:0:Location": "https://sp/acs",
            "AssertionConsumerService:0:Binding": "urn:binding",
            "certData": "MIIC"
        }));
        let nested = nest_fields(&flat).unwrap();
        assert_eq!(
            Value::Object(nested.clone()),
            json!({
                "AssertionConsumerService": {"0": {"Binding": "urn:binding", "Location": "https://sp/acs"}},
                "certData": "MIIC",
                "name": {"en": "Example"}
            })
        );
        let keys: Vec<&String> = nested.keys().collect();
        assert_eq!(keys, ["AssertionConsumerService", "certData", "name"]);
    }

    #[test]
    fn nest_reports_value_group_conflicts() {
        let flat = object(json!({"coin:stepup": "1", "coin:stepup:loa": "2"}));
        assert!(matches!(nest_fields(&flat), Err(ExportError::KeyConflict(k)) if k == "coin:stepup:loa"));
    }

    #[test]
    fn flatten_reverses_nest() {
        let flat = object(json!({
            "contacts:0:emailAddress": "a@example.org",
            "contacts:0:contactType": "technical",
            "redirectUrls": ["https://rp/cb"],
            "name:nl": "Voorbeeld"
        }));
        let round = flatten_fields(&nest_fields(&flat).unwrap());
        assert_eq!(round, flat);
    }

    #[test]
    fn dotted_flattening_keeps_arrays_and_empty_objects() {
        let map = object(json!({
            "entityid": "https://sp",
            "arp": {"enabled": true, "attributes": {}},
            "metaDataFields": {"name:en": "Example", "grants": ["implicit"]}
        }));
        let flat = flatten_dotted(&map);
        let keys: Vec<&String> = flat.keys().collect();
        assert_eq!(
            keys,
            ["arp.attributes", "arp.enabled", "entityid", "metaDataFields.grants", "metaDataFields.name:en"]
        );
        assert_eq!(flat["metaDataFields.grants"], json!(["implicit"]));
        assert_eq!(flat["arp.attributes"], json!({}));
    }

    #[test]
    fn sorted_orders_nested_objects() {
        let value = sorted(&json!({"b": {"z": 1, "a": 2}, "a": [{"d": 1, "c": 2}]}));
        assert_eq!(value.to_string(), r#"{"a":[{"c":2,"d":1}],"b":{"a":2,"z":1}}"#);
    }
}
