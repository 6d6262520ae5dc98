//! # md-revision
//!
//! Revision lifecycle for metadata documents.
//!
//! Every document moves through three states:
//!
//! - **Draft**: revision 0, just created
//! - **Latest**: revision `n > 0`, the live document after edits
//! - **Historical**: a terminated snapshot in the `<type>_revision`
//!   collection pointing at its live parent
//!
//! [`RevisionEngine`] holds the pure transitions; [`RevisionService`] runs
//! them against a [`md_storage::MetaDataStore`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod engine;
pub mod error;
pub mod service;

pub use engine::{Clock, RevisionEngine};
pub use error::{RevisionError, RevisionResult};
pub use service::RevisionService;
