//! Custom `format` validators registered with every compiled schema.
//!
//! | Format | Accepts |
//! |---|---|
//! | `certificate` | base64 X.509 certificate, with or without PEM armour |
//! | `number` | non-empty string of ASCII digits |
//! | `boolean` | `"0"` or `"1"` |
//! | `local-email` | `local@domain`, domain without a dot allowed |
//! | `uri` | any absolute URI, including URNs |
//! | `url` | absolute `http`/`https` URL with a host |
//! | `uuid` | hyphenated UUID |
//! | `brin` | four character BRIN code (two digits, two capitals) |
//! | `basic-authentication-user` | non-empty user name without `:` |

use std::collections::HashSet;
use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;

use crate::error::{SchemaError, SchemaResult};

/// Signature of a format check.
pub type FormatCheck = fn(&str) -> bool;

static LOCAL_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

static BRIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{2}$").unwrap_or_else(|e| panic!("invalid BRIN pattern: {e}"))
});

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// The fixed set of custom formats.
pub const CUSTOM_FORMATS: &[(&str, FormatCheck)] = &[
    ("certificate", is_certificate),
    ("number", is_number),
    ("boolean", is_boolean),
    ("local-email", is_local_email),
    ("uri", is_uri),
    ("url", is_url),
    ("uuid", is_uuid),
    ("brin", is_brin),
    ("basic-authentication-user", is_basic_auth_user),
];

/// Returns the custom formats, failing if two share a name.
pub fn registered_formats() -> SchemaResult<&'static [(&'static str, FormatCheck)]> {
    ensure_unique(CUSTOM_FORMATS)?;
    Ok(CUSTOM_FORMATS)
}

fn ensure_unique(formats: &[(&str, FormatCheck)]) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for (name, _) in formats {
        if !seen.insert(*name) {
            return Err(SchemaError::config(format!(
                "format validator '{name}' registered twice"
            )));
        }
    }
    Ok(())
}

/// Checks a certificate by decoding it as X.509.
///
/// Certificates whose only defect is a redundant leading zero in a DER
/// integer are accepted; many deployed certificates carry that encoding.
#[must_use]
pub fn is_certificate(value: &str) -> bool {
    use x509_parser::prelude::*;

    let body: String = value
        .replace(PEM_BEGIN, "")
        .replace(PEM_END, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if body.is_empty() {
        return false;
    }
    let Ok(der) = base64::engine::general_purpose::STANDARD.decode(body.as_bytes()) else {
        return false;
    };
    match X509Certificate::from_der(&der) {
        Ok(_) => true,
        Err(err) => is_leading_zero_quirk(&format!("{err:?}")),
    }
}

fn is_leading_zero_quirk(debug: &str) -> bool {
    debug.contains("IntegerLeadingZeroes")
}

/// Checks a non-empty string of ASCII digits.
#[must_use]
pub fn is_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Checks a `"0"`/`"1"` boolean string.
#[must_use]
pub fn is_boolean(value: &str) -> bool {
    matches!(value, "0" | "1")
}

/// Checks a loose `local@domain` address.
#[must_use]
pub fn is_local_email(value: &str) -> bool {
    LOCAL_EMAIL.is_match(value)
}

/// Checks an absolute URI.
#[must_use]
pub fn is_uri(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Checks an absolute web URL.
#[must_use]
pub fn is_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

/// Checks a hyphenated UUID.
#[must_use]
pub fn is_uuid(value: &str) -> bool {
    value.len() == 36 && uuid::Uuid::parse_str(value).is_ok()
}

/// Checks a BRIN code.
#[must_use]
pub fn is_brin(value: &str) -> bool {
    BRIN.is_match(value)
}

/// Checks a basic-authentication user name.
#[must_use]
pub fn is_basic_auth_user(value: &str) -> bool {
    !value.is_empty() && !value.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT: &str = include_str!("../../../tests/fixtures/signing.crt.b64");

    #[test]
    fn formats_are_unique() {
        assert_eq!(registered_formats().unwrap().len(), 9);
    }

    #[test]
    fn duplicate_format_names_collide() {
        let formats: &[(&str, FormatCheck)] = &[("number", is_number), ("number", is_boolean)];
        assert!(ensure_unique(formats).unwrap_err().is_configuration());
    }

    #[test]
    fn certificate_accepts_bare_and_armoured_base64() {
        assert!(is_certificate(CERT.trim()));
        let armoured = format!("{PEM_BEGIN}\n{}\n{PEM_END}\n", CERT.trim());
        assert!(is_certificate(&armoured));
        let wrapped: String = CERT
            .trim()
            .as_bytes()
            .chunks(64)
            .map(|c| format!("{}\n", String::from_utf8_lossy(c)))
            .collect();
        assert!(is_certificate(&wrapped));
    }

    #[test]
    fn certificate_rejects_garbage() {
        assert!(!is_certificate(""));
        assert!(!is_certificate("not base64 at all!"));
        assert!(!is_certificate("aGVsbG8gd29ybGQ="));
    }

    #[test]
    fn leading_zero_quirk_is_recognized() {
        assert!(is_leading_zero_quirk(
            "Error(Der(DerConstraintFailed(IntegerLeadingZeroes)))"
        ));
        assert!(!is_leading_zero_quirk("Error(InvalidCertificate)"));
    }

    #[test]
    fn scalar_formats() {
        assert!(is_number("0042"));
        assert!(!is_number("4.2"));
        assert!(!is_number(""));
        assert!(is_boolean("1"));
        assert!(!is_boolean("true"));
        assert!(is_local_email("root@localhost"));
        assert!(!is_local_email("root at localhost"));
        assert!(is_basic_auth_user("pdp-client"));
        assert!(!is_basic_auth_user("user:secret"));
        assert!(is_brin("21PB"));
        assert!(!is_brin("21pb"));
    }

    #[test]
    fn uri_and_url_formats() {
        assert!(is_uri("urn:mace:dir:attribute-def:mail"));
        assert!(is_uri("https://sp.example.org/acs"));
        assert!(!is_uri("relative/path"));
        assert!(is_url("https://sp.example.org/acs"));
        assert!(!is_url("urn:mace:dir:attribute-def:mail"));
        assert!(!is_url("ftp://files.example.org"));
    }

    #[test]
    fn uuid_format() {
        assert!(is_uuid("0b5a1f9e-5d1c-4a39-9d2b-6f1b0f6c7a11"));
        assert!(!is_uuid("0b5a1f9e5d1c4a399d2b6f1b0f6c7a11"));
    }
}
