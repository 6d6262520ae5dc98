//! Cluster lock records and their store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// A held lease on a named lock.
///
/// Records are created once and never updated; they disappear when the
/// owner removes them or when `expires_at` passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    /// Unique lock name.
    pub lock_name: String,
    /// Node holding the lease.
    pub owner_id: String,
    /// End of the lease.
    pub expires_at: DateTime<Utc>,
}

impl LockRecord {
    /// Creates a record leased for `ttl` from `now`.
    ///
    /// Returns `None` if the end of the lease is not a representable
    /// timestamp.
    #[must_use]
    pub fn new(
        lock_name: impl Into<String>,
        owner_id: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        Some(Self {
            lock_name: lock_name.into(),
            owner_id: owner_id.into(),
            expires_at: now.checked_add_signed(ttl)?,
        })
    }

    /// Returns true once the lease has run out.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Provider for lock record storage.
///
/// The store owns expiry: records past `expires_at` must be invisible to
/// `find` and must not block `insert_if_absent`.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Atomically inserts `record` unless a live record with the same name
    /// exists. Returns false on conflict.
    async fn insert_if_absent(&self, record: &LockRecord) -> StorageResult<bool>;

    /// Gets the live record of a lock.
    async fn find(&self, lock_name: &str) -> StorageResult<Option<LockRecord>>;

    /// Removes the record if `owner_id` holds it. Returns false otherwise.
    async fn remove_owned(&self, lock_name: &str, owner_id: &str) -> StorageResult<bool>;

    /// Drops every expired record. Returns how many were dropped.
    async fn purge_expired(&self) -> StorageResult<usize>;
}
