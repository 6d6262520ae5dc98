//! Depth-first merge of schema addenda.
//!
//! Object values recurse key by key, missing keys are inserted, and every
//! other value (scalars and arrays) in the addendum overwrites the base.

use serde_json::Value;

/// Merges `addendum` into `base`.
pub fn deep_merge(base: &mut Value, addendum: Value) {
    match (base, addendum) {
        (Value::Object(base_map), Value::Object(addendum_map)) => {
            for (key, value) in addendum_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, addendum) => *base = addendum,
    }
}
