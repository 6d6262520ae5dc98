//! Compiled schema of one entity type.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use md_core::{AttributeMap, METADATA_FIELDS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};

/// Storage index declared in a schema's `indexes` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHint {
    /// Index name.
    pub name: String,
    /// Index kind as declared (e.g. `hashed`, `text`).
    #[serde(rename = "type", default)]
    pub index_type: Option<String>,
    /// Indexed field paths.
    pub fields: Vec<String>,
    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}

/// A `patternProperties` entry of the metadata fields object.
#[derive(Debug, Clone)]
pub struct PatternProperty {
    /// Raw regular expression key.
    pub pattern: String,
    /// Compiled key matcher.
    pub regex: Regex,
    /// Element family the pattern belongs to (`AssertionConsumerService`).
    pub family: String,
    /// Maximum number of indexed instances, if declared.
    pub multiplicity: Option<usize>,
}

impl PatternProperty {
    fn parse(pattern: &str, definition: &Value) -> SchemaResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            SchemaError::config(format!("invalid pattern property '{pattern}': {e}"))
        })?;
        let multiplicity = definition
            .get("multiplicity")
            .and_then(Value::as_u64)
            .and_then(|m| usize::try_from(m).ok());
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            family: pattern_family(pattern),
            multiplicity,
        })
    }

    /// Returns true if `key` matches this pattern.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

/// Extracts the literal prefix of an anchored pattern.
///
/// `^shibmd:scope:([0-9]{1,2}):allowed$` yields `shibmd:scope`.
pub(crate) fn pattern_family(pattern: &str) -> String {
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    let literal: String = body
        .chars()
        .take_while(|c| !matches!(c, '(' | '[' | '{' | '\\' | '.' | '*' | '+' | '?' | '|' | '$'))
        .collect();
    literal.trim_end_matches(':').to_string()
}

/// Schema, template and introspection data of one entity type.
pub struct SchemaDescriptor {
    entity_type: String,
    path: PathBuf,
    schema: Value,
    validator: jsonschema::Validator,
    template: AttributeMap,
    indexes: Vec<IndexHint>,
    pattern_properties: Vec<PatternProperty>,
    multiplicities: HashMap<String, usize>,
}

impl fmt::Debug for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDescriptor")
            .field("entity_type", &self.entity_type)
            .field("path", &self.path)
            .field("indexes", &self.indexes)
            .field("multiplicities", &self.multiplicities)
            .finish_non_exhaustive()
    }
}

impl SchemaDescriptor {
    pub(crate) fn new(
        entity_type: String,
        path: PathBuf,
        schema: Value,
        validator: jsonschema::Validator,
        template: AttributeMap,
    ) -> SchemaResult<Self> {
        let indexes = match schema.get("indexes") {
            Some(raw) => serde_json::from_value(raw.clone()).map_err(|e| {
                SchemaError::config(format!("invalid indexes in {}: {e}", path.display()))
            })?,
            None => Vec::new(),
        };

        let mut pattern_properties = Vec::new();
        if let Some(patterns) = schema
            .pointer(&format!("/properties/{METADATA_FIELDS}/patternProperties"))
            .and_then(Value::as_object)
        {
            for (pattern, definition) in patterns {
                pattern_properties.push(PatternProperty::parse(pattern, definition)?);
            }
        }

        let mut multiplicities = HashMap::new();
        for property in &pattern_properties {
            if let Some(limit) = property.multiplicity {
                let slot = multiplicities.entry(property.family.clone()).or_insert(limit);
                *slot = (*slot).max(limit);
            }
        }

        Ok(Self {
            entity_type,
            path,
            schema,
            validator,
            template,
            indexes,
            pattern_properties,
            multiplicities,
        })
    }

    /// Entity type name (the schema `title`).
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Schema file the descriptor was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw schema tree after addendum merge.
    #[must_use]
    pub const fn schema(&self) -> &Value {
        &self.schema
    }

    /// Default document of this type.
    #[must_use]
    pub const fn template(&self) -> &AttributeMap {
        &self.template
    }

    /// Declared index hints.
    #[must_use]
    pub fn indexes(&self) -> &[IndexHint] {
        &self.indexes
    }

    /// Pattern properties of the metadata fields object.
    #[must_use]
    pub fn pattern_properties(&self) -> &[PatternProperty] {
        &self.pattern_properties
    }

    /// Returns the multiplicity limit of an element family.
    #[must_use]
    pub fn multiplicity(&self, family: &str) -> Option<usize> {
        self.multiplicities.get(family).copied()
    }

    /// Iterates all element families that declare a multiplicity.
    pub fn multiplicities(&self) -> impl Iterator<Item = (&str, usize)> {
        self.multiplicities.iter().map(|(family, limit)| (family.as_str(), *limit))
    }

    /// Returns true if a metadata field key is declared, either as a plain
    /// property or through a pattern.
    #[must_use]
    pub fn declares_field(&self, key: &str) -> bool {
        let plain = self
            .schema
            .pointer(&format!("/properties/{METADATA_FIELDS}/properties"))
            .and_then(Value::as_object)
            .is_some_and(|props| props.contains_key(key));
        plain || self.pattern_properties.iter().any(|p| p.matches(key))
    }

    /// Collects every violation of `instance`.
    pub(crate) fn violations(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|e| {
                let location = e.instance_path.to_string();
                let location = if location.is_empty() { "/".to_string() } else { location };
                format!("{location}: {e}")
            })
            .collect()
    }
}
