//! Attribute name aliases.
//!
//! Attribute authorities name the same attribute either by its legacy URN or
//! by its OID URN. The URN form is canonical and is what ARP keys use.

/// `(canonical URN, OID URN)` pairs.
const ALIASES: &[(&str, &str)] = &[
    ("urn:mace:dir:attribute-def:cn", "urn:oid:2.5.4.3"),
    ("urn:mace:dir:attribute-def:sn", "urn:oid:2.5.4.4"),
    ("urn:mace:dir:attribute-def:givenName", "urn:oid:2.5.4.42"),
    ("urn:mace:dir:attribute-def:mail", "urn:oid:0.9.2342.19200300.100.1.3"),
    ("urn:mace:dir:attribute-def:uid", "urn:oid:0.9.2342.19200300.100.1.1"),
    ("urn:mace:dir:attribute-def:displayName", "urn:oid:2.16.840.1.113730.3.1.241"),
    ("urn:mace:dir:attribute-def:preferredLanguage", "urn:oid:2.16.840.1.113730.3.1.39"),
    ("urn:mace:dir:attribute-def:eduPersonAffiliation", "urn:oid:1.3.6.1.4.1.5923.1.1.1.1"),
    ("urn:mace:dir:attribute-def:eduPersonPrincipalName", "urn:oid:1.3.6.1.4.1.5923.1.1.1.6"),
    ("urn:mace:dir:attribute-def:eduPersonEntitlement", "urn:oid:1.3.6.1.4.1.5923.1.1.1.7"),
    ("urn:mace:dir:attribute-def:eduPersonScopedAffiliation", "urn:oid:1.3.6.1.4.1.5923.1.1.1.9"),
    ("urn:mace:dir:attribute-def:eduPersonTargetedID", "urn:oid:1.3.6.1.4.1.5923.1.1.1.10"),
    ("urn:mace:dir:attribute-def:eduPersonOrcid", "urn:oid:1.3.6.1.4.1.5923.1.1.1.16"),
    ("urn:mace:dir:attribute-def:isMemberOf", "urn:oid:1.3.6.1.4.1.5923.1.5.1.1"),
    ("urn:mace:terena.org:attribute-def:schacHomeOrganization", "urn:oid:1.3.6.1.4.1.25178.1.2.9"),
    ("urn:mace:terena.org:attribute-def:schacPersonalUniqueCode", "urn:oid:1.3.6.1.4.1.25178.1.2.14"),
];

/// Returns the canonical name of an attribute. Unknown names map to
/// themselves.
#[must_use]
pub fn canonical_attribute_name(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(_, oid)| *oid == name)
        .map_or(name, |(canonical, _)| canonical)
}

/// Returns the OID alias of a canonical attribute name.
#[must_use]
pub fn oid_alias(canonical: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(urn, _)| *urn == canonical)
        .map(|(_, oid)| *oid)
}
