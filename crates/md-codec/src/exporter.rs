//! Metadata exporter.
//!
//! XML export walks the canonical map in the element order the SAML metadata
//! schema mandates, never in map order. Localized fields come out sorted by
//! language and repeated fields in ascending index order, so the output only
//! depends on the document and the export clock.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use md_arp::{ArpAttributes, ArpCodec};
use md_core::config::ExportConfig;
use md_core::{AttributeMap, AttributeMapExt, Value, ARP, METADATA_FIELDS};
use md_model::MetaDataDocument;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::constants::{
    element, field, SamlRole, ARP_NS, ATTRNAME_FORMAT_URI, DEFAULT_LANG, MAILTO, MDRPI_NS, MDUI_NS,
    MD_NS, SAMLP_NS, SHIBMD_NS, XMLDSIG_NS,
};
use crate::error::{ExportError, ExportResult};
use crate::flatten::{flatten_dotted, nest_fields, sorted};

/// Keys that never leave the store.
pub const EXCLUDED_KEYS: &[&str] = &[
    "id",
    "eid",
    "revisionid",
    "revision",
    "version",
    "user",
    "created",
    "ip",
    "notes",
    "revisionnote",
    "updatedBy",
    "parentId",
    "terminated",
];

/// Key of the entity type in exported maps.
const TYPE_KEY: &str = "type";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Exports stored documents to SAML XML and to nested or flat maps.
#[derive(Debug, Clone)]
pub struct MetadataExporter {
    validity: Duration,
    publisher: Option<String>,
}

impl Default for MetadataExporter {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

impl MetadataExporter {
    /// Creates an exporter stamping `validUntil` at `validity` past the
    /// export clock.
    #[must_use]
    pub fn new(validity: Duration) -> Self {
        Self {
            validity,
            publisher: None,
        }
    }

    /// Creates an exporter from configuration.
    #[must_use]
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            validity: config.validity(),
            publisher: config.publisher.clone(),
        }
    }

    /// Sets the publisher named in exported feeds.
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Returns the `validUntil` stamp for an export at `as_of`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::ValidityOutOfRange`] if the stamp is not a
    /// representable timestamp.
    pub fn valid_until(&self, as_of: DateTime<Utc>) -> ExportResult<String> {
        as_of
            .checked_add_signed(self.validity)
            .map(|end| end.format(TIMESTAMP_FORMAT).to_string())
            .ok_or_else(|| ExportError::ValidityOutOfRange(as_of.format(TIMESTAMP_FORMAT).to_string()))
    }

    /// Exports one SAML entity as an `EntityDescriptor` document.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedType`] for types without an XML
    /// form and [`ExportError::MissingEntityId`] for documents without an
    /// entity identifier.
    pub fn export_to_xml(&self, doc: &MetaDataDocument, as_of: DateTime<Utc>) -> ExportResult<String> {
        let mut out = XmlOut::new()?;
        let valid_until = self.valid_until(as_of)?;
        write_entity(&mut out, doc, Some(&valid_until))?;
        out.finish()
    }

    /// Exports SAML entities as one `EntitiesDescriptor` feed.
    ///
    /// Documents of types without an XML form are left out.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingEntityId`] if an exported entity has no
    /// identifier.
    pub fn export_feed(&self, docs: &[MetaDataDocument], as_of: DateTime<Utc>) -> ExportResult<String> {
        let mut out = XmlOut::new()?;
        let valid_until = self.valid_until(as_of)?;
        let creation = as_of.format(TIMESTAMP_FORMAT).to_string();

        let mut attributes: Vec<(&str, &str)> = namespace_declarations();
        if let Some(publisher) = &self.publisher {
            attributes.push(("Name", publisher.as_str()));
        }
        attributes.push(("validUntil", valid_until.as_str()));
        let root = md(element::ENTITIES_DESCRIPTOR);
        out.start(&root, &attributes)?;

        if let Some(publisher) = &self.publisher {
            out.start(&md(element::EXTENSIONS), &[])?;
            out.empty(
                &mdrpi(element::PUBLICATION_INFO),
                &[("publisher", publisher.as_str()), ("creationInstant", creation.as_str())],
            )?;
            out.end(&md(element::EXTENSIONS))?;
        }

        let mut exported = 0_usize;
        for doc in docs {
            if doc.kind().and_then(SamlRole::of).is_none() {
                debug!(id = %doc.id, entity_type = %doc.entity_type, "Leaving entity out of feed");
                continue;
            }
            write_entity(&mut out, doc, None)?;
            exported += 1;
        }
        out.end(&root)?;
        debug!(exported, "Feed exported");
        out.finish()
    }

    /// Exports a document as a map without internal bookkeeping keys.
    ///
    /// The nested form regroups colon-delimited metadata fields into a
    /// tree; the flat form joins nested object paths with `.`. Both are
    /// sorted by key.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::KeyConflict`] if the metadata fields cannot be
    /// nested.
    pub fn export_to_map(&self, doc: &MetaDataDocument, flatten: bool) -> ExportResult<AttributeMap> {
        let mut map = AttributeMap::new();
        map.insert(TYPE_KEY.to_string(), Value::String(doc.base_type().to_string()));
        for (key, value) in &doc.data {
            if EXCLUDED_KEYS.contains(&key.as_str()) || key == TYPE_KEY {
                continue;
            }
            match value {
                Value::Object(fields) if key == METADATA_FIELDS && !flatten => {
                    map.insert(key.clone(), Value::Object(nest_fields(fields)?));
                }
                _ => {
                    map.insert(key.clone(), value.clone());
                }
            }
        }

        if flatten {
            return Ok(flatten_dotted(&map));
        }
        let ordered: BTreeMap<String, Value> = map
            .into_iter()
            .map(|(key, value)| (key, sorted(&value)))
            .collect();
        Ok(ordered.into_iter().collect())
    }
}

fn md(local: &str) -> String {
    format!("md:{local}")
}

fn mdui(local: &str) -> String {
    format!("mdui:{local}")
}

fn mdrpi(local: &str) -> String {
    format!("mdrpi:{local}")
}

fn namespace_declarations() -> Vec<(&'static str, &'static str)> {
    vec![
        ("xmlns:md", MD_NS),
        ("xmlns:mdui", MDUI_NS),
        ("xmlns:mdrpi", MDRPI_NS),
        ("xmlns:shibmd", SHIBMD_NS),
        ("xmlns:ds", XMLDSIG_NS),
        ("xmlns:arp", ARP_NS),
    ]
}

/// Indented XML writer with string element names.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> ExportResult<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(ExportError::xml)?;
        Ok(Self { writer })
    }

    fn tag<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
        let mut tag = BytesStart::new(name);
        for attribute in attributes {
            tag.push_attribute(*attribute);
        }
        tag
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> ExportResult<()> {
        self.writer
            .write_event(Event::Start(Self::tag(name, attributes)))
            .map_err(ExportError::xml)
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> ExportResult<()> {
        self.writer
            .write_event(Event::Empty(Self::tag(name, attributes)))
            .map_err(ExportError::xml)
    }

    fn end(&mut self, name: &str) -> ExportResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(ExportError::xml)
    }

    fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> ExportResult<()> {
        self.start(name, attributes)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(ExportError::xml)?;
        self.end(name)
    }

    fn finish(self) -> ExportResult<String> {
        String::from_utf8(self.writer.into_inner()).map_err(ExportError::xml)
    }
}

/// Read-only view of the metadata fields of one document.
struct Fields<'a> {
    fields: Option<&'a AttributeMap>,
}

impl<'a> Fields<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        self.fields?.get(key).and_then(Value::as_str)
    }

    /// Values of `prefix:lang` keys, sorted by language.
    fn localized(&self, prefix: &str) -> BTreeMap<&'a str, &'a str> {
        let mut out = BTreeMap::new();
        let Some(fields) = self.fields else {
            return out;
        };
        for (key, value) in fields {
            let Some(lang) = key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(':'))
            else {
                continue;
            };
            if let (false, Some(value)) = (lang.contains(':'), value.as_str()) {
                out.insert(lang, value);
            }
        }
        out
    }

    /// `family:index:field` values grouped by index, sorted numerically.
    fn indexed(&self, family: &str) -> BTreeMap<usize, BTreeMap<&'a str, &'a str>> {
        let mut out: BTreeMap<usize, BTreeMap<&str, &str>> = BTreeMap::new();
        let Some(fields) = self.fields else {
            return out;
        };
        for (key, value) in fields {
            let Some((index, name)) = key
                .strip_prefix(family)
                .and_then(|rest| rest.strip_prefix(':'))
                .and_then(|rest| rest.split_once(':'))
            else {
                continue;
            };
            if let (Ok(index), Some(value)) = (index.parse::<usize>(), value.as_str()) {
                out.entry(index).or_default().insert(name, value);
            }
        }
        out
    }
}

fn write_entity(out: &mut XmlOut, doc: &MetaDataDocument, valid_until: Option<&str>) -> ExportResult<()> {
    let role = doc
        .kind()
        .and_then(SamlRole::of)
        .ok_or_else(|| ExportError::UnsupportedType(doc.entity_type.clone()))?;
    let entity_id = doc
        .entity_id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ExportError::MissingEntityId(doc.id.clone()))?;
    let fields = Fields {
        fields: doc.data.metadata_fields(),
    };
    let arp = match role {
        SamlRole::ServiceProvider => doc.data.get(ARP).and_then(ArpAttributes::from_value),
        SamlRole::IdentityProvider => None,
    };

    let mut attributes: Vec<(&str, &str)> = match valid_until {
        Some(_) => namespace_declarations(),
        None => Vec::new(),
    };
    attributes.push(("entityID", entity_id));
    if let Some(valid_until) = valid_until {
        attributes.push(("validUntil", valid_until));
    }
    let root = md(element::ENTITY_DESCRIPTOR);
    out.start(&root, &attributes)?;

    write_entity_extensions(out, &fields, arp.as_ref())?;
    write_role(out, role, entity_id, &fields, arp.as_ref())?;
    write_organization(out, &fields)?;
    write_contacts(out, &fields)?;

    out.end(&root)
}

fn write_entity_extensions(out: &mut XmlOut, fields: &Fields<'_>, arp: Option<&ArpAttributes>) -> ExportResult<()> {
    let authority = fields.get(field::REGISTRATION_INFO);
    if authority.is_none() && arp.is_none() {
        return Ok(());
    }
    out.start(&md(element::EXTENSIONS), &[])?;
    if let Some(authority) = authority {
        let info = mdrpi(element::REGISTRATION_INFO);
        out.start(&info, &[("registrationAuthority", authority)])?;
        for (lang, policy) in fields.localized(field::REGISTRATION_POLICY) {
            out.text_element(&mdrpi(element::REGISTRATION_POLICY), &[("xml:lang", lang)], policy)?;
        }
        out.end(&info)?;
    }
    if let Some(arp) = arp {
        let blob = ArpCodec::encode(arp);
        out.text_element(&format!("arp:{}", element::ATTRIBUTE_RELEASE_POLICY), &[], &blob)?;
    }
    out.end(&md(element::EXTENSIONS))
}

fn write_role(
    out: &mut XmlOut,
    role: SamlRole,
    entity_id: &str,
    fields: &Fields<'_>,
    arp: Option<&ArpAttributes>,
) -> ExportResult<()> {
    let descriptor = md(role.element());
    out.start(&descriptor, &[("protocolSupportEnumeration", SAMLP_NS)])?;

    write_role_extensions(out, role, fields)?;
    write_keys(out, fields)?;
    write_endpoints(out, element::SINGLE_LOGOUT_SERVICE, fields)?;
    if let Some(format) = fields.get(field::NAME_ID_FORMAT) {
        out.text_element(&md(element::NAME_ID_FORMAT), &[], format)?;
    }
    write_endpoints(out, role.endpoint(), fields)?;

    if let Some(arp) = arp.filter(|arp| arp.enabled && !arp.is_empty()) {
        let service = md(element::ATTRIBUTE_CONSUMING_SERVICE);
        out.start(&service, &[("index", "0")])?;
        let name = fields.get(&field::localized(field::NAME, DEFAULT_LANG)).unwrap_or(entity_id);
        out.text_element(&md(element::SERVICE_NAME), &[("xml:lang", DEFAULT_LANG)], name)?;
        for attribute in arp.attributes.keys() {
            out.empty(
                &md(element::REQUESTED_ATTRIBUTE),
                &[("Name", attribute.as_str()), ("NameFormat", ATTRNAME_FORMAT_URI)],
            )?;
        }
        out.end(&service)?;
    }

    out.end(&descriptor)
}

fn write_role_extensions(out: &mut XmlOut, role: SamlRole, fields: &Fields<'_>) -> ExportResult<()> {
    let scopes = match role {
        SamlRole::IdentityProvider => fields.indexed(field::SCOPE),
        SamlRole::ServiceProvider => BTreeMap::new(),
    };
    let names = fields.localized(field::NAME);
    let descriptions = fields.localized(field::DESCRIPTION);
    let urls = fields.localized(field::URL);
    let privacy = fields.localized(field::PRIVACY_STATEMENT_URL);
    let logos = fields.indexed(field::LOGO);
    let has_ui = !(names.is_empty()
        && descriptions.is_empty()
        && urls.is_empty()
        && privacy.is_empty()
        && logos.is_empty());
    if scopes.is_empty() && !has_ui {
        return Ok(());
    }

    out.start(&md(element::EXTENSIONS), &[])?;
    for scope in scopes.values() {
        let Some(allowed) = scope.get("allowed") else {
            continue;
        };
        let regexp = scope
            .get("regexp")
            .map(|flag| if *flag == "1" { "true" } else { "false" });
        let attributes: Vec<(&str, &str)> = regexp.map(|r| ("regexp", r)).into_iter().collect();
        out.text_element(&format!("shibmd:{}", element::SCOPE), &attributes, allowed)?;
    }
    if has_ui {
        let info = mdui(element::UI_INFO);
        out.start(&info, &[])?;
        for (elem, values) in [
            (element::DISPLAY_NAME, &names),
            (element::DESCRIPTION, &descriptions),
            (element::INFORMATION_URL, &urls),
            (element::PRIVACY_STATEMENT_URL, &privacy),
        ] {
            for (lang, value) in values {
                out.text_element(&mdui(elem), &[("xml:lang", *lang)], value)?;
            }
        }
        for logo in logos.values() {
            let Some(url) = logo.get("url") else {
                continue;
            };
            let attributes: Vec<(&str, &str)> = ["width", "height"]
                .into_iter()
                .filter_map(|name| logo.get(name).map(|value| (name, *value)))
                .collect();
            out.text_element(&mdui(element::LOGO), &attributes, url)?;
        }
        out.end(&info)?;
    }
    out.end(&md(element::EXTENSIONS))
}

fn write_keys(out: &mut XmlOut, fields: &Fields<'_>) -> ExportResult<()> {
    let primary = fields.get(field::CERT_DATA);
    let secondary = fields.get(field::CERT_DATA2);
    let keys: Vec<(Option<&str>, &str)> = match (primary, secondary) {
        (Some(signing), Some(encryption)) => vec![(Some("signing"), signing), (Some("encryption"), encryption)],
        (Some(only), None) | (None, Some(only)) => vec![(None, only)],
        (None, None) => Vec::new(),
    };
    for (usage, certificate) in keys {
        let descriptor = md(element::KEY_DESCRIPTOR);
        let attributes: Vec<(&str, &str)> = usage.map(|u| ("use", u)).into_iter().collect();
        out.start(&descriptor, &attributes)?;
        out.start("ds:KeyInfo", &[])?;
        out.start("ds:X509Data", &[])?;
        out.text_element("ds:X509Certificate", &[], certificate)?;
        out.end("ds:X509Data")?;
        out.end("ds:KeyInfo")?;
        out.end(&descriptor)?;
    }
    Ok(())
}

fn write_endpoints(out: &mut XmlOut, family: &str, fields: &Fields<'_>) -> ExportResult<()> {
    for endpoint in fields.indexed(family).values() {
        let attributes: Vec<(&str, &str)> = [field::BINDING, field::LOCATION, field::INDEX]
            .into_iter()
            .filter_map(|name| endpoint.get(name).map(|value| (name, *value)))
            .collect();
        if !attributes.is_empty() {
            out.empty(&md(family), &attributes)?;
        }
    }
    Ok(())
}

fn write_organization(out: &mut XmlOut, fields: &Fields<'_>) -> ExportResult<()> {
    let parts = [
        element::ORGANIZATION_NAME,
        element::ORGANIZATION_DISPLAY_NAME,
        element::ORGANIZATION_URL,
    ]
    .map(|name| (name, fields.localized(name)));
    if parts.iter().all(|(_, values)| values.is_empty()) {
        return Ok(());
    }
    let organization = md(element::ORGANIZATION);
    out.start(&organization, &[])?;
    for (name, values) in &parts {
        for (lang, value) in values {
            out.text_element(&md(name), &[("xml:lang", *lang)], value)?;
        }
    }
    out.end(&organization)
}

fn write_contacts(out: &mut XmlOut, fields: &Fields<'_>) -> ExportResult<()> {
    const ELEMENTS: [&str; 4] = [
        element::GIVEN_NAME,
        element::SUR_NAME,
        element::EMAIL_ADDRESS,
        element::TELEPHONE_NUMBER,
    ];
    for contact in fields.indexed(field::CONTACTS).values() {
        let kind = contact.get("contactType").copied().unwrap_or("other");
        let person = md(element::CONTACT_PERSON);
        out.start(&person, &[("contactType", kind)])?;
        for (name, elem) in field::CONTACT_FIELDS.iter().zip(ELEMENTS) {
            let Some(value) = contact.get(name) else {
                continue;
            };
            if elem == element::EMAIL_ADDRESS && !value.starts_with(MAILTO) {
                out.text_element(&md(elem), &[], &format!("{MAILTO}{value}"))?;
            } else {
                out.text_element(&md(elem), &[], value)?;
            }
        }
        out.end(&person)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use md_model::EntityType;
    use md_schema::SchemaRegistry;
    use serde_json::json;

    use super::*;
    use crate::MetadataImporter;

    const SCHEMAS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/schemas");
    const TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/templates");
    const SP_XML: &str = include_str!("../../../tests/fixtures/sp.xml");
    const IDP_XML: &str = include_str!("../../../tests/fixtures/idp.xml");

    fn importer() -> MetadataImporter {
        MetadataImporter::new(Arc::new(SchemaRegistry::load(SCHEMAS, TEMPLATES).unwrap()))
    }

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn imported(xml: &str, entity_type: EntityType) -> MetaDataDocument {
        let map = importer().import_xml(xml.as_bytes(), entity_type, None).unwrap();
        MetaDataDocument::new(entity_type, map)
    }

    fn object(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn export_is_deterministic() {
        let exporter = MetadataExporter::default();
        let doc = imported(SP_XML, EntityType::SamlSp);
        let first = exporter.export_to_xml(&doc, clock()).unwrap();
        let second = exporter.export_to_xml(&doc, clock()).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(first.contains("validUntil=\"2026-10-30T12:00:00Z\""));
    }

    #[test]
    fn service_provider_round_trips() {
        let doc = imported(SP_XML, EntityType::SamlSp);
        let xml = MetadataExporter::default().export_to_xml(&doc, clock()).unwrap();
        let again = importer()
            .import_xml(xml.as_bytes(), EntityType::SamlSp, None)
            .unwrap();
        assert_eq!(again, doc.data);
    }

    #[test]
    fn identity_provider_round_trips() {
        let doc = imported(IDP_XML, EntityType::SamlIdp);
        let xml = MetadataExporter::default().export_to_xml(&doc, clock()).unwrap();
        assert!(xml.contains("<shibmd:Scope regexp=\"false\">example.org</shibmd:Scope>"));
        let again = importer()
            .import_xml(xml.as_bytes(), EntityType::SamlIdp, None)
            .unwrap();
        assert_eq!(again, doc.data);
    }

    #[test]
    fn elements_follow_schema_order() {
        let doc = imported(SP_XML, EntityType::SamlSp);
        let xml = MetadataExporter::default().export_to_xml(&doc, clock()).unwrap();
        let position = |needle: &str| xml.find(needle).unwrap();
        assert!(position("<arp:AttributeReleasePolicy>") < position("<md:SPSSODescriptor"));
        assert!(position("<mdui:UIInfo>") < position("<md:KeyDescriptor use=\"signing\">"));
        assert!(position("<md:KeyDescriptor use=\"encryption\">") < position("<md:SingleLogoutService"));
        assert!(position("<md:NameIDFormat>") < position("<md:AssertionConsumerService"));
        assert!(position("<md:AttributeConsumingService") < position("<md:Organization>"));
        assert!(position("mailto:jane.doe@example.org") < position("helpdesk@example.org"));
        assert!(position("<mdui:DisplayName xml:lang=\"en\">") < position("<mdui:DisplayName xml:lang=\"nl\">"));
    }

    #[test]
    fn indexes_come_out_in_numeric_order() {
        let data = object(json!({
            "entityid": "https://sp.example.org",
            "metaDataFields": {
                "AssertionConsumerService:10:Location": "https://sp/acs/10",
                "AssertionConsumerService:2:Location": "https://sp/acs/2"
            }
        }));
        let doc = MetaDataDocument::new(EntityType::SamlSp, data);
        let xml = MetadataExporter::default().export_to_xml(&doc, clock()).unwrap();
        assert!(xml.find("https://sp/acs/2").unwrap() < xml.find("https://sp/acs/10").unwrap());
    }

    #[test]
    fn unsupported_and_incomplete_documents_fail() {
        let exporter = MetadataExporter::default();
        let oidc = MetaDataDocument::new(EntityType::OidcRp, object(json!({"entityid": "rp"})));
        assert!(matches!(
            exporter.export_to_xml(&oidc, clock()),
            Err(ExportError::UnsupportedType(t)) if t == "oidc10_rp"
        ));
        let anonymous = MetaDataDocument::new(EntityType::SamlSp, object(json!({"metaDataFields": {}})));
        assert!(matches!(
            exporter.export_to_xml(&anonymous, clock()),
            Err(ExportError::MissingEntityId(_))
        ));
    }

    #[test]
    fn unrepresentable_valid_until_is_an_error() {
        let doc = imported(SP_XML, EntityType::SamlSp);
        let exporter = MetadataExporter::new(Duration::days(100_000_000));
        assert!(matches!(
            exporter.export_to_xml(&doc, clock()),
            Err(ExportError::ValidityOutOfRange(_))
        ));
        assert!(matches!(
            exporter.export_feed(&[doc], clock()),
            Err(ExportError::ValidityOutOfRange(_))
        ));
        assert_eq!(
            MetadataExporter::new(Duration::days(1)).valid_until(clock()).unwrap(),
            "2026-10-17T12:00:00Z"
        );
    }

    #[test]
    fn feed_export_names_publisher_and_skips_oidc() {
        let exporter = MetadataExporter::default().with_publisher("https://federation.example.org");
        let docs = [
            imported(SP_XML, EntityType::SamlSp),
            MetaDataDocument::new(EntityType::OidcRp, object(json!({"entityid": "rp"}))),
            imported(IDP_XML, EntityType::SamlIdp),
        ];
        let xml = exporter.export_feed(&docs, clock()).unwrap();
        assert!(xml.contains("Name=\"https://federation.example.org\""));
        assert!(xml.contains("creationInstant=\"2026-10-16T12:00:00Z\""));
        assert_eq!(xml.matches("<md:EntityDescriptor ").count(), 2);

        let entities: Vec<_> = importer()
            .import_feed(xml.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0], docs[0].data);
    }

    #[test]
    fn map_export_drops_bookkeeping_and_nests_fields() {
        let mut doc = MetaDataDocument::new(
            EntityType::SamlSp,
            object(json!({
                "entityid": "https://sp.example.org",
                "revisionnote": "initial",
                "notes": "internal",
                "state": "testaccepted",
                "metaDataFields": {"name:en": "Example", "AssertionConsumerService:0:Location": "https://sp/acs"}
            })),
        );
        doc.entity_type = "saml20_sp_revision".into();
        let nested = MetadataExporter::default().export_to_map(&doc, false).unwrap();
        assert_eq!(
            Value::Object(nested.clone()),
            json!({
                "entityid": "https://sp.example.org",
                "metaDataFields": {
                    "AssertionConsumerService": {"0": {"Location": "https://sp/acs"}},
                    "name": {"en": "Example"}
                },
                "state": "testaccepted",
                "type": "saml20_sp"
            })
        );
        let keys: Vec<&String> = nested.keys().collect();
        assert_eq!(keys, ["entityid", "metaDataFields", "state", "type"]);
    }

    #[test]
    fn flat_map_export_uses_dotted_paths() {
        let doc = MetaDataDocument::new(
            EntityType::OidcRp,
            object(json!({
                "entityid": "https://rp.example.org",
                "created": "2026-10-16",
                "metaDataFields": {"redirectUrls": ["https://rp/cb"], "name:en": "RP"}
            })),
        );
        let flat = MetadataExporter::default().export_to_map(&doc, true).unwrap();
        let keys: Vec<&String> = flat.keys().collect();
        assert_eq!(keys, ["entityid", "metaDataFields.name:en", "metaDataFields.redirectUrls", "type"]);
        assert_eq!(flat["type"], json!("oidc10_rp"));
    }
}
