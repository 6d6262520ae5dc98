//! Per-entity scan state machine.
//!
//! The scanner sees the elements of one `EntityDescriptor` in document order
//! and keeps three pieces of state: the element path (with the inherited
//! `xml:lang` of each frame), a [`RepeatCounter`] assigning indexes to
//! repeated element families, and the values collected so far. It never
//! reads XML itself; the importer drives it with decoded tokens, and the
//! [`Directive`] returned for each start tag tells the driver whether to
//! descend or to skip the subtree.

use std::collections::HashMap;

use md_arp::{ArpAttributes, ArpCodec, ArpValue};
use md_core::{AttributeMap, Value, ARP, ENTITY_ID, METADATA_FIELDS};
use md_schema::SchemaDescriptor;
use tracing::debug;

use crate::aliases::canonical_attribute_name;
use crate::constants::{element, field, KeyUse, SamlRole, DEFAULT_LANG, MAILTO};
use crate::error::{ImportError, ImportResult};
use crate::xml::Element;

/// Assigns document-order indexes to repeated element families, capped at
/// the multiplicity each family declares.
#[derive(Debug, Clone, Default)]
pub struct RepeatCounter {
    limits: HashMap<String, usize>,
    next: HashMap<String, usize>,
}

impl RepeatCounter {
    /// Creates a counter with explicit limits. Families without a limit are
    /// unbounded.
    #[must_use]
    pub fn with_limits<'a>(limits: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        Self {
            limits: limits
                .into_iter()
                .map(|(family, limit)| (family.to_string(), limit))
                .collect(),
            next: HashMap::new(),
        }
    }

    /// Creates a counter with the limits declared by a schema.
    #[must_use]
    pub fn for_schema(descriptor: &SchemaDescriptor) -> Self {
        Self::with_limits(descriptor.multiplicities())
    }

    /// Returns the next index of `family`, or `None` once the cap is reached.
    pub fn next_index(&mut self, family: &str) -> Option<usize> {
        let next = self.next.entry(family.to_string()).or_insert(0);
        if self.limits.get(family).is_some_and(|limit| *next >= *limit) {
            return None;
        }
        let index = *next;
        *next += 1;
        Some(index)
    }

    /// Returns how many indexes were handed out for `family`.
    #[must_use]
    pub fn assigned(&self, family: &str) -> usize {
        let next = self.next.get(family).copied().unwrap_or(0);
        self.limits.get(family).map_or(next, |limit| next.min(*limit))
    }
}

/// What the driver should do with the element just opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Feed the children to the scanner.
    Descend,
    /// Consume the subtree without scanning it.
    Skip,
}

#[derive(Debug)]
struct Frame {
    element: Element,
    lang: Option<String>,
    index: Option<usize>,
    text: String,
}

/// Scan state of one entity descriptor.
#[derive(Debug)]
pub struct EntityScanner {
    role: SamlRole,
    counter: RepeatCounter,
    path: Vec<Frame>,
    role_seen: bool,
    fields: AttributeMap,
    certificates: Vec<(KeyUse, String)>,
    requested: Vec<String>,
    arp_blob: Option<String>,
}

impl EntityScanner {
    /// Creates a scanner for one entity.
    #[must_use]
    pub fn new(role: SamlRole, counter: RepeatCounter) -> Self {
        Self {
            role,
            counter,
            path: Vec::new(),
            role_seen: false,
            fields: AttributeMap::new(),
            certificates: Vec::new(),
            requested: Vec::new(),
            arp_blob: None,
        }
    }

    fn parent(&self) -> Option<&str> {
        self.path.last().map(|frame| frame.element.local.as_str())
    }

    fn within(&self, local: &str) -> Option<&Frame> {
        self.path.iter().rev().find(|frame| frame.element.local == local)
    }

    fn parent_is_role(&self) -> bool {
        self.parent() == Some(self.role.element())
    }

    fn family_of(&self, local: &str) -> Option<&'static str> {
        const ENDPOINTS: [&str; 3] = [
            element::ASSERTION_CONSUMER_SERVICE,
            element::SINGLE_SIGN_ON_SERVICE,
            element::SINGLE_LOGOUT_SERVICE,
        ];
        let parent = self.parent()?;
        match local {
            _ if parent == self.role.element() => ENDPOINTS.into_iter().find(|e| *e == local),
            element::LOGO if parent == element::UI_INFO => Some(field::LOGO),
            element::SCOPE if parent == element::EXTENSIONS => Some(field::SCOPE),
            _ => None,
        }
    }

    /// Handles a start tag.
    pub(crate) fn open(&mut self, element: Element) -> Directive {
        let local = element.local.as_str();
        if local == element::SIGNATURE {
            return Directive::Skip;
        }
        if SamlRole::is_role_element(local) {
            if local != self.role.element() {
                debug!(role = local, "Skipping role descriptor");
                return Directive::Skip;
            }
            self.role_seen = true;
        }

        let family = if local == element::CONTACT_PERSON && self.path.is_empty() {
            Some(field::CONTACTS)
        } else {
            self.family_of(local)
        };
        let index = match family {
            Some(family) => match self.counter.next_index(family) {
                Some(index) => Some(index),
                None => {
                    debug!(family, "Dropping element beyond multiplicity");
                    return Directive::Skip;
                }
            },
            None => None,
        };

        let lang = element
            .attr("xml:lang")
            .map(str::to_string)
            .or_else(|| self.path.last().and_then(|frame| frame.lang.clone()));
        self.path.push(Frame {
            element,
            lang,
            index,
            text: String::new(),
        });
        Directive::Descend
    }

    /// Appends character data to the current element.
    pub(crate) fn text(&mut self, text: &str) {
        if let Some(frame) = self.path.last_mut() {
            frame.text.push_str(text);
        }
    }

    fn set(&mut self, key: String, value: impl Into<String>) {
        self.fields.insert(key, Value::String(value.into()));
    }

    fn set_if_absent(&mut self, key: String, value: impl Into<String>) {
        if !self.fields.contains_key(&key) {
            self.set(key, value);
        }
    }

    /// Handles an end tag.
    pub(crate) fn close(&mut self) {
        let Some(frame) = self.path.pop() else {
            return;
        };
        let text = frame.text.trim().to_string();
        let lang = frame.lang.as_deref().unwrap_or(DEFAULT_LANG).to_string();
        let parent = self.parent().unwrap_or_default().to_string();
        let element = &frame.element;

        match (element.local.as_str(), parent.as_str()) {
            (element::X509_CERTIFICATE, _) => {
                if let Some(key) = self.within(element::KEY_DESCRIPTOR) {
                    let usage = KeyUse::from_attribute(key.element.attr("use"));
                    let certificate: String = text.split_whitespace().collect();
                    if !certificate.is_empty() {
                        self.certificates.push((usage, certificate));
                    }
                }
            }
            (element::NAME_ID_FORMAT, _) if self.parent_is_role() && !text.is_empty() => {
                self.set_if_absent(field::NAME_ID_FORMAT.to_string(), text);
            }
            (
                element::ASSERTION_CONSUMER_SERVICE
                | element::SINGLE_SIGN_ON_SERVICE
                | element::SINGLE_LOGOUT_SERVICE,
                _,
            ) => {
                if let Some(index) = frame.index {
                    let family = element.local.as_str();
                    for attribute in [field::BINDING, field::LOCATION, field::INDEX] {
                        if let Some(value) = element.attr(attribute) {
                            self.set(field::indexed(family, index, attribute), value);
                        }
                    }
                }
            }
            (element::DISPLAY_NAME, element::UI_INFO) => {
                self.set(field::localized(field::NAME, &lang), text);
            }
            (element::DESCRIPTION, element::UI_INFO) => {
                self.set(field::localized(field::DESCRIPTION, &lang), text);
            }
            (element::INFORMATION_URL, element::UI_INFO) => {
                self.set(field::localized(field::URL, &lang), text);
            }
            (element::PRIVACY_STATEMENT_URL, element::UI_INFO) => {
                self.set(field::localized(field::PRIVACY_STATEMENT_URL, &lang), text);
            }
            (element::LOGO, element::UI_INFO) => {
                if let Some(index) = frame.index {
                    self.set(field::indexed(field::LOGO, index, "url"), text);
                    for attribute in ["width", "height"] {
                        if let Some(value) = element.attr(attribute) {
                            self.set(field::indexed(field::LOGO, index, attribute), value);
                        }
                    }
                }
            }
            (element::SCOPE, element::EXTENSIONS) => {
                if let Some(index) = frame.index {
                    self.set(field::indexed(field::SCOPE, index, "allowed"), text);
                    if let Some(regexp) = element.attr("regexp") {
                        let flag = if matches!(regexp, "true" | "1") { "1" } else { "0" };
                        self.set(field::indexed(field::SCOPE, index, "regexp"), flag);
                    }
                }
            }
            (
                element::ORGANIZATION_NAME | element::ORGANIZATION_DISPLAY_NAME | element::ORGANIZATION_URL,
                element::ORGANIZATION,
            ) => {
                let key = field::localized(&element.local, &lang);
                self.set(key, text);
            }
            (
                element::GIVEN_NAME | element::SUR_NAME | element::EMAIL_ADDRESS | element::TELEPHONE_NUMBER,
                element::CONTACT_PERSON,
            ) => {
                let Some(index) = self.path.last().and_then(|contact| contact.index) else {
                    return;
                };
                let (name, value) = match element.local.as_str() {
                    element::GIVEN_NAME => ("givenName", text.as_str()),
                    element::SUR_NAME => ("surName", text.as_str()),
                    element::EMAIL_ADDRESS => (
                        "emailAddress",
                        text.strip_prefix(MAILTO).unwrap_or(&text),
                    ),
                    _ => ("telephoneNumber", text.as_str()),
                };
                let value = value.to_string();
                self.set_if_absent(field::indexed(field::CONTACTS, index, name), value);
            }
            (element::CONTACT_PERSON, _) => {
                if let (Some(index), Some(kind)) = (frame.index, element.attr("contactType")) {
                    self.set(field::indexed(field::CONTACTS, index, "contactType"), kind);
                }
            }
            (element::REGISTRATION_INFO, _) => {
                if let Some(authority) = element.attr("registrationAuthority") {
                    self.set(field::REGISTRATION_INFO.to_string(), authority);
                }
            }
            (element::REGISTRATION_POLICY, element::REGISTRATION_INFO) => {
                self.set(field::localized(field::REGISTRATION_POLICY, &lang), text);
            }
            (element::REQUESTED_ATTRIBUTE, _) => {
                if let Some(name) = element.attr("Name") {
                    self.requested.push(name.to_string());
                }
            }
            (element::ATTRIBUTE_RELEASE_POLICY, _) => {
                self.arp_blob = Some(text);
            }
            _ => {}
        }
    }

    /// Returns how many indexes `family` received so far.
    #[must_use]
    pub fn assigned(&self, family: &str) -> usize {
        self.counter.assigned(family)
    }

    fn release_policy(&self, entity_id: &str) -> ImportResult<Option<ArpAttributes>> {
        let mut arp = ArpAttributes::disabled();
        for name in &self.requested {
            arp.allow(canonical_attribute_name(name), ArpValue::wildcard());
        }

        let Some(blob) = &self.arp_blob else {
            return Ok((!self.requested.is_empty()).then_some(arp));
        };
        let decoded = ArpCodec::decode(blob).map_err(|source| ImportError::Arp {
            entity_id: entity_id.to_string(),
            source,
        })?;
        if !decoded.enabled {
            return Ok(Some(ArpAttributes::disabled()));
        }

        // Aliases collapse onto one canonical name; the merged list keeps
        // each value once.
        let mut grouped: Vec<(String, Vec<ArpValue>)> = Vec::new();
        for (name, values) in decoded.attributes {
            let canonical = canonical_attribute_name(&name).to_string();
            let at = match grouped.iter().position(|(n, _)| *n == canonical) {
                Some(at) => at,
                None => {
                    grouped.push((canonical, Vec::new()));
                    grouped.len() - 1
                }
            };
            let merged = &mut grouped[at].1;
            for value in values {
                if !merged.contains(&value) {
                    merged.push(value);
                }
            }
        }
        arp.enabled = true;
        for (name, values) in grouped {
            arp.replace(name, values);
        }
        Ok(Some(arp))
    }

    /// Completes the scan and builds the canonical map.
    ///
    /// # Errors
    ///
    /// Fails when the entity has no identifier, lacks the scanned role, or
    /// carries an undecodable release policy.
    pub fn finish(mut self, entity_id: Option<String>) -> ImportResult<AttributeMap> {
        let entity_id = entity_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ImportError::MissingEntityId)?;
        if !self.role_seen {
            return Err(ImportError::MissingRole {
                entity_id,
                role: self.role.element(),
            });
        }

        let mut certificates = std::mem::take(&mut self.certificates);
        certificates.sort_by_key(|(usage, _)| usage.rank());
        let mut unique: Vec<String> = Vec::new();
        for (_, certificate) in certificates {
            if !unique.contains(&certificate) {
                unique.push(certificate);
            }
        }
        for (key, certificate) in [field::CERT_DATA, field::CERT_DATA2].into_iter().zip(unique) {
            self.set(key.to_string(), certificate);
        }

        let arp = self.release_policy(&entity_id)?;

        let mut map = AttributeMap::new();
        map.insert(ENTITY_ID.to_string(), Value::String(entity_id));
        map.insert(METADATA_FIELDS.to_string(), Value::Object(self.fields));
        if let Some(arp) = arp {
            map.insert(ARP.to_string(), arp.to_value());
        }
        Ok(map)
    }
}
