//! # md-model
//!
//! Domain model for federation metadata.
//!
//! ## Entities
//!
//! - [`MetaDataDocument`] - a stored metadata entity with its canonical data
//! - [`Revision`] - revision bookkeeping of a document
//! - [`EntityType`] - the kinds of metadata entities (SAML SP/IdP, OIDC RP)
//! - [`LifecycleState`] - draft, latest or historical

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod document;
pub mod entity_type;
pub mod revision;

pub use document::MetaDataDocument;
pub use entity_type::{base_type_name, EntityType, REVISION_SUFFIX};
pub use revision::{LifecycleState, Revision, SYSTEM_ACTOR};
