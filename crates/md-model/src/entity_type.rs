//! Metadata entity types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Suffix appended to an entity type name for historical snapshots.
pub const REVISION_SUFFIX: &str = "_revision";

/// Kind of metadata entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    /// SAML 2.0 service provider.
    #[serde(rename = "saml20_sp")]
    SamlSp,
    /// SAML 2.0 identity provider.
    #[serde(rename = "saml20_idp")]
    SamlIdp,
    /// OpenID Connect relying party.
    #[serde(rename = "oidc10_rp")]
    OidcRp,
}

impl EntityType {
    /// All known entity types.
    pub const ALL: [Self; 3] = [Self::SamlSp, Self::SamlIdp, Self::OidcRp];

    /// Returns the type name used in schemas and storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SamlSp => "saml20_sp",
            Self::SamlIdp => "saml20_idp",
            Self::OidcRp => "oidc10_rp",
        }
    }

    /// Returns the type name of historical snapshots of this type.
    #[must_use]
    pub fn revision_type(&self) -> String {
        format!("{}{REVISION_SUFFIX}", self.as_str())
    }

    /// Returns true for the SAML entity types.
    #[must_use]
    pub const fn is_saml(&self) -> bool {
        matches!(self, Self::SamlSp | Self::SamlIdp)
    }

    /// Parses a stored type name, accepting the revision suffix.
    ///
    /// Returns the entity type and whether the name denoted a historical
    /// snapshot.
    #[must_use]
    pub fn from_stored(name: &str) -> Option<(Self, bool)> {
        match name.strip_suffix(REVISION_SUFFIX) {
            Some(base) => base.parse().ok().map(|t| (t, true)),
            None => name.parse().ok().map(|t| (t, false)),
        }
    }
}

/// Strips the revision suffix from a stored type name.
#[must_use]
pub fn base_type_name(name: &str) -> &str {
    name.strip_suffix(REVISION_SUFFIX).unwrap_or(name)
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "saml20_sp" => Ok(Self::SamlSp),
            "saml20_idp" => Ok(Self::SamlIdp),
            "oidc10_rp" => Ok(Self::OidcRp),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for entity_type in EntityType::ALL {
            assert_eq!(entity_type.as_str().parse::<EntityType>(), Ok(entity_type));
        }
        assert!("saml20_proxy".parse::<EntityType>().is_err());
    }

    #[test]
    fn stored_names_carry_the_historical_flag() {
        assert_eq!(
            EntityType::from_stored("saml20_sp_revision"),
            Some((EntityType::SamlSp, true))
        );
        assert_eq!(
            EntityType::from_stored("oidc10_rp"),
            Some((EntityType::OidcRp, false))
        );
        assert_eq!(EntityType::from_stored("unknown_revision"), None);
        assert_eq!(base_type_name("saml20_idp_revision"), "saml20_idp");
        assert_eq!(EntityType::SamlIdp.revision_type(), "saml20_idp_revision");
    }
}
