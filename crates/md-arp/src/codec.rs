//! Conversion between serialized policies and [`ArpAttributes`].

use tracing::trace;

use crate::error::{ArpError, ArpResult};
use crate::php::{self, PhpKey, PhpValue};
use crate::policy::{ArpAttributes, ArpEntry, ArpValue};

const NULL_SENTINEL: &str = "N;";

/// Stateless ARP codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArpCodec;

impl ArpCodec {
    /// Decodes a serialized policy.
    ///
    /// The empty string and `N;` mean "no policy configured". Any other input
    /// must be a serialized array of attribute names to value lists.
    ///
    /// # Errors
    ///
    /// Returns [`ArpError`] if the input does not parse or is not shaped like
    /// a policy.
    pub fn decode(serialized: &str) -> ArpResult<ArpAttributes> {
        let trimmed = serialized.trim();
        if trimmed.is_empty() || trimmed == NULL_SENTINEL {
            return Ok(ArpAttributes::disabled());
        }

        let PhpValue::Array(attributes) = php::parse(trimmed)? else {
            return Err(ArpError::structure("top level is not an array"));
        };

        let mut arp = ArpAttributes::release_nothing();
        for (key, raw_values) in attributes {
            let name = key.to_text();
            let entries = entries_of(&name, raw_values)?;
            let values: Vec<ArpValue> = entries.into_iter().map(ArpEntry::normalize).collect();
            trace!(attribute = %name, values = values.len(), "Decoded ARP attribute");
            arp.replace(name, values);
        }
        Ok(arp)
    }

    /// Encodes a policy in the record form. A disabled policy encodes as `N;`.
    #[must_use]
    pub fn encode(arp: &ArpAttributes) -> String {
        if !arp.enabled {
            return NULL_SENTINEL.to_string();
        }
        let attributes = arp
            .attributes
            .iter()
            .map(|(name, values)| {
                let list = values
                    .iter()
                    .zip(0_i64..)
                    .map(|(value, index)| {
                        let record = PhpValue::Array(vec![
                            (PhpKey::Str("source".into()), PhpValue::Str(value.source.clone())),
                            (PhpKey::Str("value".into()), PhpValue::Str(value.value.clone())),
                        ]);
                        (PhpKey::Int(index), record)
                    })
                    .collect();
                (PhpKey::Str(name.clone()), PhpValue::Array(list))
            })
            .collect();
        php::write(&PhpValue::Array(attributes))
    }
}

fn entries_of(attribute: &str, raw: PhpValue) -> ArpResult<Vec<ArpEntry>> {
    match raw {
        PhpValue::Array(items) => items
            .into_iter()
            .map(|(_, item)| entry_of(attribute, item))
            .collect(),
        scalar => entry_of(attribute, scalar).map(|entry| vec![entry]),
    }
}

fn entry_of(attribute: &str, raw: PhpValue) -> ArpResult<ArpEntry> {
    match raw {
        PhpValue::Array(fields) => {
            let mut source = None;
            let mut value = None;
            for (key, field) in fields {
                match key {
                    PhpKey::Str(k) if k == "source" => source = scalar_text(attribute, field)?,
                    PhpKey::Str(k) if k == "value" => value = scalar_text(attribute, field)?,
                    _ => {}
                }
            }
            Ok(ArpEntry::Record { source, value })
        }
        scalar => Ok(ArpEntry::Bare(scalar_text(attribute, scalar)?.unwrap_or_default())),
    }
}

fn scalar_text(attribute: &str, raw: PhpValue) -> ArpResult<Option<String>> {
    match raw {
        PhpValue::Null => Ok(None),
        PhpValue::Str(s) => Ok(Some(s)),
        PhpValue::Int(i) => Ok(Some(i.to_string())),
        PhpValue::Float(f) => Ok(Some(f.to_string())),
        PhpValue::Bool(b) => Ok(Some(u8::from(b).to_string())),
        PhpValue::Array(_) => Err(ArpError::structure(format!(
            "nested array inside value of '{attribute}'"
        ))),
    }
}
