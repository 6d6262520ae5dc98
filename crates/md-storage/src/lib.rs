//! # md-storage
//!
//! Storage abstraction traits for federation metadata.
//!
//! This crate defines the persistence interfaces the revision service and
//! the cluster lock are written against, plus a process-local backend:
//!
//! ## Provider Traits
//!
//! - [`MetaDataStore`] - documents keyed by id within one collection per
//!   stored type, with unique entity ids and optimistic versions
//! - [`LockStore`] - lease records with atomic insert and TTL expiry
//!
//! ## Backends
//!
//! - [`InMemoryStore`] - `dashmap`-backed implementation of both traits

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod lock;
pub mod memory;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use lock::{LockRecord, LockStore};
pub use memory::InMemoryStore;
pub use store::MetaDataStore;
