//! Namespaces, element names and canonical field keys of SAML metadata.

use md_model::EntityType;

/// SAML 2.0 metadata namespace URI.
pub const MD_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// Metadata UI extension namespace URI.
pub const MDUI_NS: &str = "urn:oasis:names:tc:SAML:metadata:ui";

/// Registration and publication info namespace URI.
pub const MDRPI_NS: &str = "urn:oasis:names:tc:SAML:metadata:rpi";

/// Shibboleth metadata extension namespace URI.
pub const SHIBMD_NS: &str = "urn:mace:shibboleth:metadata:1.0";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Attribute release policy extension namespace URI.
pub const ARP_NS: &str = "urn:mace:federation:metadata:arp";

/// SAML 2.0 protocol namespace URI, used in `protocolSupportEnumeration`.
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// URI attribute name format.
pub const ATTRNAME_FORMAT_URI: &str = "urn:oasis:names:tc:SAML:2.0:attrname-format:uri";

/// Language assumed for localized elements without `xml:lang`.
pub const DEFAULT_LANG: &str = "en";

/// Prefix stripped from contact e-mail addresses on import.
pub const MAILTO: &str = "mailto:";

/// Local element names.
pub mod element {
    /// `md:EntitiesDescriptor`
    pub const ENTITIES_DESCRIPTOR: &str = "EntitiesDescriptor";
    /// `md:EntityDescriptor`
    pub const ENTITY_DESCRIPTOR: &str = "EntityDescriptor";
    /// `md:SPSSODescriptor`
    pub const SP_SSO_DESCRIPTOR: &str = "SPSSODescriptor";
    /// `md:IDPSSODescriptor`
    pub const IDP_SSO_DESCRIPTOR: &str = "IDPSSODescriptor";
    /// `md:Extensions`
    pub const EXTENSIONS: &str = "Extensions";
    /// `md:KeyDescriptor`
    pub const KEY_DESCRIPTOR: &str = "KeyDescriptor";
    /// `ds:X509Certificate`
    pub const X509_CERTIFICATE: &str = "X509Certificate";
    /// `ds:Signature`
    pub const SIGNATURE: &str = "Signature";
    /// `md:NameIDFormat`
    pub const NAME_ID_FORMAT: &str = "NameIDFormat";
    /// `md:AssertionConsumerService`
    pub const ASSERTION_CONSUMER_SERVICE: &str = "AssertionConsumerService";
    /// `md:SingleSignOnService`
    pub const SINGLE_SIGN_ON_SERVICE: &str = "SingleSignOnService";
    /// `md:SingleLogoutService`
    pub const SINGLE_LOGOUT_SERVICE: &str = "SingleLogoutService";
    /// `md:AttributeConsumingService`
    pub const ATTRIBUTE_CONSUMING_SERVICE: &str = "AttributeConsumingService";
    /// `md:ServiceName`
    pub const SERVICE_NAME: &str = "ServiceName";
    /// `md:RequestedAttribute`
    pub const REQUESTED_ATTRIBUTE: &str = "RequestedAttribute";
    /// `mdui:UIInfo`
    pub const UI_INFO: &str = "UIInfo";
    /// `mdui:DisplayName`
    pub const DISPLAY_NAME: &str = "DisplayName";
    /// `mdui:Description`
    pub const DESCRIPTION: &str = "Description";
    /// `mdui:InformationURL`
    pub const INFORMATION_URL: &str = "InformationURL";
    /// `mdui:PrivacyStatementURL`
    pub const PRIVACY_STATEMENT_URL: &str = "PrivacyStatementURL";
    /// `mdui:Logo`
    pub const LOGO: &str = "Logo";
    /// `shibmd:Scope`
    pub const SCOPE: &str = "Scope";
    /// `mdrpi:RegistrationInfo`
    pub const REGISTRATION_INFO: &str = "RegistrationInfo";
    /// `mdrpi:RegistrationPolicy`
    pub const REGISTRATION_POLICY: &str = "RegistrationPolicy";
    /// `mdrpi:PublicationInfo`
    pub const PUBLICATION_INFO: &str = "PublicationInfo";
    /// `md:Organization`
    pub const ORGANIZATION: &str = "Organization";
    /// `md:OrganizationName`
    pub const ORGANIZATION_NAME: &str = "OrganizationName";
    /// `md:OrganizationDisplayName`
    pub const ORGANIZATION_DISPLAY_NAME: &str = "OrganizationDisplayName";
    /// `md:OrganizationURL`
    pub const ORGANIZATION_URL: &str = "OrganizationURL";
    /// `md:ContactPerson`
    pub const CONTACT_PERSON: &str = "ContactPerson";
    /// `md:GivenName`
    pub const GIVEN_NAME: &str = "GivenName";
    /// `md:SurName`
    pub const SUR_NAME: &str = "SurName";
    /// `md:EmailAddress`
    pub const EMAIL_ADDRESS: &str = "EmailAddress";
    /// `md:TelephoneNumber`
    pub const TELEPHONE_NUMBER: &str = "TelephoneNumber";
    /// `arp:AttributeReleasePolicy`
    pub const ATTRIBUTE_RELEASE_POLICY: &str = "AttributeReleasePolicy";

    /// Role descriptors other than the two SSO roles. Always skipped.
    pub const OTHER_ROLES: &[&str] = &[
        "RoleDescriptor",
        "AuthnAuthorityDescriptor",
        "AttributeAuthorityDescriptor",
        "PDPDescriptor",
    ];
}

/// Canonical field keys and repeated-element families.
pub mod field {
    /// Primary certificate.
    pub const CERT_DATA: &str = "certData";
    /// Secondary certificate.
    pub const CERT_DATA2: &str = "certData2";
    /// Name identifier format.
    pub const NAME_ID_FORMAT: &str = "NameIDFormat";
    /// Registration authority.
    pub const REGISTRATION_INFO: &str = "mdrpi:RegistrationInfo";
    /// Localized registration policy prefix.
    pub const REGISTRATION_POLICY: &str = "mdrpi:RegistrationPolicy";
    /// Localized display name prefix.
    pub const NAME: &str = "name";
    /// Localized description prefix.
    pub const DESCRIPTION: &str = "description";
    /// Localized information URL prefix.
    pub const URL: &str = "url";
    /// Localized privacy statement prefix.
    pub const PRIVACY_STATEMENT_URL: &str = "mdui:PrivacyStatementURL";
    /// Logo family.
    pub const LOGO: &str = "logo";
    /// Contact family.
    pub const CONTACTS: &str = "contacts";
    /// Scope family.
    pub const SCOPE: &str = "shibmd:scope";
    /// Binding field of a service endpoint.
    pub const BINDING: &str = "Binding";
    /// Location field of a service endpoint.
    pub const LOCATION: &str = "Location";
    /// Index field of an assertion consumer service.
    pub const INDEX: &str = "index";
    /// Contact fields in export order.
    pub const CONTACT_FIELDS: &[&str] = &[
        "givenName",
        "surName",
        "emailAddress",
        "telephoneNumber",
    ];

    /// Builds a `family:index:field` key.
    #[must_use]
    pub fn indexed(family: &str, index: usize, field: &str) -> String {
        format!("{family}:{index}:{field}")
    }

    /// Builds a `prefix:lang` key.
    #[must_use]
    pub fn localized(prefix: &str, lang: &str) -> String {
        format!("{prefix}:{lang}")
    }
}

/// SSO role a SAML entity is imported or exported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamlRole {
    /// Service provider.
    ServiceProvider,
    /// Identity provider.
    IdentityProvider,
}

impl SamlRole {
    /// Returns the role for an entity type, if it is a SAML type.
    #[must_use]
    pub const fn of(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::SamlSp => Some(Self::ServiceProvider),
            EntityType::SamlIdp => Some(Self::IdentityProvider),
            EntityType::OidcRp => None,
        }
    }

    /// Returns the local name of the role descriptor element.
    #[must_use]
    pub const fn element(&self) -> &'static str {
        match self {
            Self::ServiceProvider => element::SP_SSO_DESCRIPTOR,
            Self::IdentityProvider => element::IDP_SSO_DESCRIPTOR,
        }
    }

    /// Returns the endpoint element through which the role receives
    /// authentication traffic.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::ServiceProvider => element::ASSERTION_CONSUMER_SERVICE,
            Self::IdentityProvider => element::SINGLE_SIGN_ON_SERVICE,
        }
    }

    /// Returns true if `local` names any role descriptor.
    #[must_use]
    pub fn is_role_element(local: &str) -> bool {
        local == element::SP_SSO_DESCRIPTOR
            || local == element::IDP_SSO_DESCRIPTOR
            || element::OTHER_ROLES.contains(&local)
    }
}

/// `use` attribute of a key descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyUse {
    /// Signing key.
    Signing,
    /// No `use` attribute: both signing and encryption.
    Unspecified,
    /// Encryption key.
    Encryption,
}

impl KeyUse {
    /// Parses the `use` attribute.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("signing") => Self::Signing,
            Some("encryption") => Self::Encryption,
            _ => Self::Unspecified,
        }
    }

    /// Ordering rank: signing keys before encryption keys.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Signing | Self::Unspecified => 0,
            Self::Encryption => 1,
        }
    }
}
