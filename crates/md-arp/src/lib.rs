//! # md-arp
//!
//! Attribute release policy (ARP) codec.
//!
//! Policies reach the metadata core as legacy PHP-serialized nested arrays,
//! either in the old style (attribute name to a list of bare value strings)
//! or the new style (attribute name to a list of `{source, value}` records).
//! Both shapes decode to the same [`ArpAttributes`]:
//!
//! ```rust
//! use md_arp::ArpCodec;
//!
//! let old = ArpCodec::decode(r#"a:1:{s:4:"mail";a:1:{i:0;s:1:"*";}}"#).unwrap();
//! let new = ArpCodec::decode(
//!     r#"a:1:{s:4:"mail";a:1:{i:0;a:2:{s:6:"source";s:3:"idp";s:5:"value";s:1:"*";}}}"#,
//! )
//! .unwrap();
//! assert_eq!(old, new);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod error;
pub mod php;
pub mod policy;

pub use codec::ArpCodec;
pub use error::{ArpError, ArpResult};
pub use policy::{ArpAttributes, ArpEntry, ArpValue, DEFAULT_SOURCE, WILDCARD};
