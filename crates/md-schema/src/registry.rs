//! Schema registry.
//!
//! Loaded once at startup from a schema directory and a template directory
//! and immutable afterwards, so a single registry can be shared across
//! threads behind an `Arc`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::Draft;
use md_core::AttributeMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::descriptor::{IndexHint, SchemaDescriptor};
use crate::error::{SchemaError, SchemaResult, ValidationError};
use crate::formats;
use crate::merge::deep_merge;

const SCHEMA_SUFFIX: &str = ".schema.json";
const ADDENDUM_SUFFIX: &str = ".addendum.json";
const TEMPLATE_SUFFIX: &str = ".template.json";

/// Registry of compiled schemas keyed by entity type.
#[derive(Debug)]
pub struct SchemaRegistry {
    descriptors: BTreeMap<String, SchemaDescriptor>,
}

impl SchemaRegistry {
    /// Loads every `*.schema.json` in `config_dir`.
    ///
    /// A sibling `<stem>.addendum.json` is deep-merged into the schema before
    /// compiling. Each schema must carry a `title` naming its entity type and
    /// have a `<title>.template.json` in `template_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Configuration`] when no schema is found, when a
    /// schema, addendum or template cannot be read or parsed, or when a
    /// schema does not compile.
    pub fn load(config_dir: impl AsRef<Path>, template_dir: impl AsRef<Path>) -> SchemaResult<Self> {
        let config_dir = config_dir.as_ref();
        let template_dir = template_dir.as_ref();
        formats::registered_formats()?;

        let mut schema_files: Vec<PathBuf> = fs::read_dir(config_dir)
            .map_err(|e| {
                SchemaError::config(format!("cannot read schema directory {}: {e}", config_dir.display()))
            })?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| file_name(path).is_some_and(|name| name.ends_with(SCHEMA_SUFFIX)))
            .collect();
        schema_files.sort();

        if schema_files.is_empty() {
            return Err(SchemaError::config(format!(
                "no schema files found in {}",
                config_dir.display()
            )));
        }

        let mut descriptors = BTreeMap::new();
        for path in schema_files {
            let descriptor = load_descriptor(&path, template_dir)?;
            info!(
                entity_type = descriptor.entity_type(),
                path = %path.display(),
                indexes = descriptor.indexes().len(),
                "Loaded schema"
            );
            let entity_type = descriptor.entity_type().to_string();
            if descriptors.insert(entity_type.clone(), descriptor).is_some() {
                return Err(SchemaError::config(format!(
                    "schema title '{entity_type}' declared twice"
                )));
            }
        }

        Ok(Self { descriptors })
    }

    /// Validates a document against the schema of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownType`] for an unregistered type and
    /// [`SchemaError::Validation`] carrying every violation otherwise.
    pub fn validate(&self, instance: &Value, entity_type: &str) -> SchemaResult<()> {
        let descriptor = self.schema(entity_type)?;
        let messages = descriptor.violations(instance);
        if messages.is_empty() {
            return Ok(());
        }
        debug!(entity_type, violations = messages.len(), "Schema validation failed");
        Err(ValidationError {
            entity_type: entity_type.to_string(),
            schema_path: descriptor.path().to_path_buf(),
            messages,
        }
        .into())
    }

    /// Returns the descriptor of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownType`] if no schema is registered.
    pub fn schema(&self, entity_type: &str) -> SchemaResult<&SchemaDescriptor> {
        self.descriptors
            .get(entity_type)
            .ok_or_else(|| SchemaError::UnknownType(entity_type.to_string()))
    }

    /// Returns a fresh copy of the default document of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownType`] if no schema is registered.
    pub fn template(&self, entity_type: &str) -> SchemaResult<AttributeMap> {
        self.schema(entity_type).map(|d| d.template().clone())
    }

    /// Returns the index hints of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownType`] if no schema is registered.
    pub fn indexes(&self, entity_type: &str) -> SchemaResult<&[IndexHint]> {
        self.schema(entity_type).map(SchemaDescriptor::indexes)
    }

    /// Registered entity type names in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn read_json(path: &Path) -> SchemaResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| SchemaError::config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| SchemaError::config(format!("cannot parse {}: {e}", path.display())))
}

fn load_descriptor(path: &Path, template_dir: &Path) -> SchemaResult<SchemaDescriptor> {
    let mut schema = read_json(path)?;

    let stem = file_name(path)
        .and_then(|name| name.strip_suffix(SCHEMA_SUFFIX))
        .ok_or_else(|| SchemaError::config(format!("unexpected schema file {}", path.display())))?;
    let addendum_path = path.with_file_name(format!("{stem}{ADDENDUM_SUFFIX}"));
    if addendum_path.is_file() {
        let addendum = read_json(&addendum_path)?;
        deep_merge(&mut schema, addendum);
        debug!(addendum = %addendum_path.display(), "Merged schema addendum");
    }

    let entity_type = schema
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::config(format!("schema {} has no title", path.display())))?
        .to_string();

    let template_path = template_dir.join(format!("{entity_type}{TEMPLATE_SUFFIX}"));
    let template = match read_json(&template_path)? {
        Value::Object(map) => map,
        _ => {
            return Err(SchemaError::config(format!(
                "template {} is not a JSON object",
                template_path.display()
            )))
        }
    };

    let validator = jsonschema::options()
        .with_draft(Draft::Draft7)
        .should_validate_formats(true)
        .with_format("certificate", formats::is_certificate)
        .with_format("number", formats::is_number)
        .with_format("boolean", formats::is_boolean)
        .with_format("local-email", formats::is_local_email)
        .with_format("uri", formats::is_uri)
        .with_format("url", formats::is_url)
        .with_format("uuid", formats::is_uuid)
        .with_format("brin", formats::is_brin)
        .with_format("basic-authentication-user", formats::is_basic_auth_user)
        .build(&schema)
        .map_err(|e| SchemaError::config(format!("cannot compile {}: {e}", path.display())))?;

    SchemaDescriptor::new(entity_type, path.to_path_buf(), schema, validator, template)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    const SHIPPED_SCHEMAS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/schemas");
    const SHIPPED_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/templates");
    const CERT: &str = include_str!("../../../tests/fixtures/signing.crt.b64");

    fn shipped() -> SchemaRegistry {
        SchemaRegistry::load(SHIPPED_SCHEMAS, SHIPPED_TEMPLATES).unwrap()
    }

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn minimal_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "saml20_sp",
            "type": "object",
            "required": ["entityid"],
            "properties": {
                "entityid": {"type": "string", "minLength": 1},
                "state": {"type": "string", "enum": ["testaccepted", "prodaccepted"]}
            }
        })
    }

    #[test]
    fn loads_shipped_schemas() {
        let registry = shipped();
        let types: Vec<&str> = registry.types().collect();
        assert_eq!(types, vec!["oidc10_rp", "saml20_idp", "saml20_sp"]);
        assert!(registry.template("saml20_sp").unwrap().contains_key("metaDataFields"));
    }

    #[test]
    fn shipped_sp_schema_exposes_multiplicities_and_indexes() {
        let registry = shipped();
        let sp = registry.schema("saml20_sp").unwrap();
        assert_eq!(sp.multiplicity("AssertionConsumerService"), Some(10));
        assert_eq!(sp.multiplicity("contacts"), Some(4));
        assert!(sp.declares_field("coin:institution_brin"));
        let indexes = registry.indexes("saml20_sp").unwrap();
        assert!(indexes.iter().any(|i| i.unique && i.fields == ["data.entityid"]));
    }

    #[test]
    fn addendum_adds_brin_format() {
        let registry = shipped();
        let document = json!({
            "entityid": "https://sp.example.org",
            "state": "testaccepted",
            "metaDataFields": {"coin:institution_brin": "bad-brin"}
        });
        let err = registry.validate(&document, "saml20_sp").unwrap_err();
        let details = err.as_validation().unwrap();
        assert!(details.messages.iter().any(|m| m.contains("coin:institution_brin")));
    }

    #[test]
    fn validates_realistic_sp_document() {
        let registry = shipped();
        let document = json!({
            "entityid": "https://sp.example.org",
            "state": "prodaccepted",
            "metaDataFields": {
                "AssertionConsumerService:0:Binding": "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
                "AssertionConsumerService:0:Location": "https://sp.example.org/acs",
                "certData": CERT.trim(),
                "contacts:0:contactType": "technical",
                "contacts:0:emailAddress": "root@localhost",
                "name:en": "Example SP",
                "coin:institution_brin": "21PB"
            },
            "arp": {"enabled": true, "attributes": {}}
        });
        registry.validate(&document, "saml20_sp").unwrap();
    }

    #[test]
    fn validation_collects_every_violation() {
        let registry = shipped();
        let document = json!({
            "state": "bogus",
            "metaDataFields": {"certData": "not-a-certificate"}
        });
        let err = registry.validate(&document, "saml20_sp").unwrap_err();
        let details = err.as_validation().unwrap();
        assert!(details.messages.len() >= 3, "{:?}", details.messages);
        assert!(details.schema_path.ends_with("saml20_sp.schema.json"));
    }

    #[test]
    fn unknown_type_is_reported() {
        let registry = shipped();
        assert!(matches!(
            registry.validate(&json!({}), "saml20_aa"),
            Err(SchemaError::UnknownType(t)) if t == "saml20_aa"
        ));
    }

    #[test]
    fn empty_directory_is_configuration_error() {
        let schemas = TempDir::new().unwrap();
        let templates = TempDir::new().unwrap();
        let err = SchemaRegistry::load(schemas.path(), templates.path()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn malformed_schema_is_configuration_error() {
        let schemas = TempDir::new().unwrap();
        let templates = TempDir::new().unwrap();
        fs::write(schemas.path().join("saml20_sp.schema.json"), "{ not json").unwrap();
        let err = SchemaRegistry::load(schemas.path(), templates.path()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_template_is_configuration_error() {
        let schemas = TempDir::new().unwrap();
        let templates = TempDir::new().unwrap();
        write(schemas.path(), "saml20_sp.schema.json", &minimal_schema());
        let err = SchemaRegistry::load(schemas.path(), templates.path()).unwrap_err();
        assert!(err.to_string().contains("saml20_sp.template.json"));
    }

    #[test]
    fn addendum_overrides_scalars_and_merges_objects() {
        let schemas = TempDir::new().unwrap();
        let templates = TempDir::new().unwrap();
        write(schemas.path(), "saml20_sp.schema.json", &minimal_schema());
        write(
            schemas.path(),
            "saml20_sp.addendum.json",
            &json!({"properties": {"entityid": {"minLength": 10}, "notes": {"type": "string"}}}),
        );
        write(templates.path(), "saml20_sp.template.json", &json!({"entityid": ""}));

        let registry = SchemaRegistry::load(schemas.path(), templates.path()).unwrap();
        let raw = registry.schema("saml20_sp").unwrap().schema();
        assert_eq!(raw["properties"]["entityid"]["minLength"], 10);
        assert_eq!(raw["properties"]["entityid"]["type"], "string");
        assert_eq!(raw["properties"]["notes"]["type"], "string");
        assert!(registry.validate(&json!({"entityid": "short"}), "saml20_sp").is_err());
        assert!(registry
            .validate(&json!({"entityid": "https://long.example.org"}), "saml20_sp")
            .is_ok());
    }
}
