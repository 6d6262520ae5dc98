//! Metadata importer.

use std::io::BufRead;
use std::sync::Arc;

use md_core::event::{EventBuilder, EventType, MetadataEvent};
use md_core::{AttributeMap, AttributeMapExt, Value, METADATA_FIELDS};
use md_model::EntityType;
use md_schema::merge::deep_merge;
use md_schema::SchemaRegistry;
use quick_xml::Reader;
use tracing::debug;

use crate::constants::{element, SamlRole};
use crate::error::{ImportError, ImportResult};
use crate::feed::FeedEntities;
use crate::flatten::flatten_fields;
use crate::scanner::{Directive, EntityScanner, RepeatCounter};
use crate::xml::{self, Token};

/// Key of the entity type in nested JSON documents. Dropped on import.
const TYPE_KEY: &str = "type";

/// Imports SAML XML and nested JSON into canonical attribute maps.
///
/// Holds no mutable state, so independent imports may run concurrently on a
/// shared importer.
#[derive(Debug, Clone)]
pub struct MetadataImporter {
    registry: Arc<SchemaRegistry>,
}

impl MetadataImporter {
    /// Creates an importer over a loaded schema registry.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the schema registry.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn scan_setup(&self, entity_type: EntityType) -> ImportResult<(SamlRole, RepeatCounter)> {
        let role = SamlRole::of(entity_type)
            .ok_or_else(|| ImportError::UnsupportedType(entity_type.to_string()))?;
        let descriptor = self.registry.schema(entity_type.as_str())?;
        Ok((role, RepeatCounter::for_schema(descriptor)))
    }

    /// Imports one entity from a metadata document.
    ///
    /// The document may be a single `EntityDescriptor` or an aggregate. With
    /// `known_entity_id` the matching descriptor is imported; without it, the
    /// first one.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] on malformed XML, a missing entity, a
    /// descriptor without the role of `entity_type`, or an undecodable
    /// release policy. Unexpected elements are skipped, never rejected.
    pub fn import_xml<R: BufRead>(
        &self,
        source: R,
        entity_type: EntityType,
        known_entity_id: Option<&str>,
    ) -> ImportResult<AttributeMap> {
        let (role, counter) = self.scan_setup(entity_type)?;
        let mut reader = xml::reader(source);
        let mut buf = Vec::new();

        loop {
            let (element, empty) = match xml::next_token(&mut reader, &mut buf)? {
                Token::Start(element) => (element, false),
                Token::Empty(element) => (element, true),
                Token::Eof => {
                    return Err(ImportError::EntityNotFound(
                        known_entity_id.unwrap_or("<any>").to_string(),
                    ))
                }
                _ => continue,
            };

            match element.local.as_str() {
                element::ENTITIES_DESCRIPTOR => {}
                element::ENTITY_DESCRIPTOR => {
                    let entity_id = element.attr("entityID").map(str::to_string);
                    if known_entity_id.is_some_and(|known| entity_id.as_deref() != Some(known)) {
                        if !empty {
                            xml::skip(&mut reader, &element.qname, &mut buf)?;
                        }
                        continue;
                    }
                    debug!(entity_id = ?entity_id, entity_type = %entity_type, "Importing entity");
                    let scanner = EntityScanner::new(role, counter);
                    let map = if empty {
                        scanner.finish(entity_id)?
                    } else {
                        scan_entity(&mut reader, &mut buf, scanner, entity_id)?
                    };
                    import_audit(&map, entity_type, "xml").emit();
                    return Ok(map);
                }
                _ if !empty => xml::skip(&mut reader, &element.qname, &mut buf)?,
                _ => {}
            }
        }
    }

    /// Imports every service provider of an aggregate feed.
    ///
    /// # Errors
    ///
    /// Fails only if the service provider schema is not registered; entity
    /// failures surface while iterating.
    pub fn import_feed<R: BufRead>(&self, source: R) -> ImportResult<FeedEntities<R>> {
        self.import_feed_of(source, EntityType::SamlSp)
    }

    /// Imports every entity of `entity_type` from an aggregate feed.
    ///
    /// # Errors
    ///
    /// Fails if `entity_type` has no XML form or no registered schema.
    pub fn import_feed_of<R: BufRead>(
        &self,
        source: R,
        entity_type: EntityType,
    ) -> ImportResult<FeedEntities<R>> {
        let (role, counter) = self.scan_setup(entity_type)?;
        Ok(FeedEntities::new(xml::reader(source), entity_type, role, counter))
    }

    /// Imports a nested JSON document.
    ///
    /// The nested `metaDataFields` tree is collapsed into colon-delimited keys
    /// and the result is validated against the schema of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidJson`] for non-object input and
    /// [`ImportError::Schema`] carrying every violation otherwise.
    pub fn import_json(&self, entity_type: EntityType, nested: &Value) -> ImportResult<AttributeMap> {
        let Value::Object(document) = nested else {
            return Err(ImportError::InvalidJson("expected a JSON object".to_string()));
        };

        let mut map = AttributeMap::new();
        for (key, value) in document {
            match (key.as_str(), value) {
                (TYPE_KEY, _) => {}
                (METADATA_FIELDS, Value::Object(fields)) => {
                    map.insert(key.clone(), Value::Object(flatten_fields(fields)));
                }
                (METADATA_FIELDS, _) => {
                    return Err(ImportError::InvalidJson(format!("{METADATA_FIELDS} is not an object")));
                }
                _ => {
                    map.insert(key.clone(), value.clone());
                }
            }
        }

        let candidate = Value::Object(map);
        self.registry.validate(&candidate, entity_type.as_str())?;
        match candidate {
            Value::Object(map) => {
                import_audit(&map, entity_type, "json").emit();
                Ok(map)
            }
            _ => Err(ImportError::InvalidJson("expected a JSON object".to_string())),
        }
    }

    /// Completes an imported map with the template defaults of its type.
    ///
    /// Imported values win; nested objects such as `metaDataFields` are
    /// merged key by key.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Schema`] if the type is not registered.
    pub fn with_defaults(&self, entity_type: EntityType, imported: AttributeMap) -> ImportResult<AttributeMap> {
        let mut document = Value::Object(self.registry.template(entity_type.as_str())?);
        deep_merge(&mut document, Value::Object(imported));
        match document {
            Value::Object(map) => Ok(map),
            _ => Err(ImportError::InvalidJson("template is not an object".to_string())),
        }
    }
}

fn import_audit(map: &AttributeMap, entity_type: EntityType, format: &str) -> EventBuilder {
    let event = MetadataEvent::builder(EventType::MetadataImported).detail("format", format);
    match map.entity_id() {
        Some(entity_id) => event.entity(entity_id, entity_type.as_str()),
        None => event,
    }
}

/// Feeds the children of an open `EntityDescriptor` to `scanner` and
/// finishes it once the matching end tag is consumed.
pub(crate) fn scan_entity<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
    mut scanner: EntityScanner,
    entity_id: Option<String>,
) -> ImportResult<AttributeMap> {
    let mut depth = 0_usize;
    loop {
        match xml::next_token(reader, buf)? {
            Token::Start(element) => {
                let qname = element.qname.clone();
                match scanner.open(element) {
                    Directive::Descend => depth += 1,
                    Directive::Skip => xml::skip(reader, &qname, buf)?,
                }
            }
            Token::Empty(element) => {
                if scanner.open(element) == Directive::Descend {
                    scanner.close();
                }
            }
            Token::Text(text) => scanner.text(&text),
            Token::End => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                scanner.close();
            }
            Token::Eof => {
                return Err(ImportError::xml("document ends inside an EntityDescriptor"));
            }
            Token::Other => {}
        }
    }
    scanner.finish(entity_id)
}
