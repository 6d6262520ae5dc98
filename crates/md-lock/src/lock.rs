//! Named leases shared by all nodes of a deployment.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use md_core::config::LockConfig;
use md_storage::{LockRecord, LockStore};
use tracing::{debug, info};

use crate::error::{LockError, LockResult};

/// A lease-based lock over a shared [`LockStore`].
///
/// Acquiring is a single atomic insert; the store enforces name uniqueness.
/// There is no heartbeat: a holder that dies keeps the lease until its TTL
/// runs out, after which any node may take it.
#[derive(Clone)]
pub struct ClusterLock {
    store: Arc<dyn LockStore>,
    owner_id: String,
}

impl std::fmt::Debug for ClusterLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterLock")
            .field("owner_id", &self.owner_id)
            .finish_non_exhaustive()
    }
}

impl ClusterLock {
    /// Creates a lock handle acting as `owner_id`.
    #[must_use]
    pub fn new(store: Arc<dyn LockStore>, owner_id: impl Into<String>) -> Self {
        Self {
            store,
            owner_id: owner_id.into(),
        }
    }

    /// Creates a lock handle acting as the configured node.
    #[must_use]
    pub fn from_config(store: Arc<dyn LockStore>, config: &LockConfig) -> Self {
        Self::new(store, config.node_id.clone())
    }

    /// Returns the identity written into held leases.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Tries to take the lease on `lock_name` for `ttl`.
    ///
    /// Returns `Ok(false)` if a live lease exists, including one held by
    /// this owner.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::InvalidTtl`] for leases whose end is not a
    /// representable timestamp and storage errors unchanged.
    pub async fn try_acquire(&self, lock_name: &str, ttl: Duration) -> LockResult<bool> {
        let lease = chrono::Duration::from_std(ttl).map_err(|_| LockError::InvalidTtl(ttl))?;
        let record = LockRecord::new(lock_name, self.owner_id.as_str(), lease, Utc::now())
            .ok_or(LockError::InvalidTtl(ttl))?;
        let acquired = self.store.insert_if_absent(&record).await?;
        if acquired {
            info!(
                lock_name,
                owner_id = %self.owner_id,
                expires_at = %record.expires_at,
                "Lock acquired"
            );
        } else {
            debug!(lock_name, owner_id = %self.owner_id, "Lock held elsewhere");
        }
        Ok(acquired)
    }

    /// Gives up the lease on `lock_name` if this owner holds it.
    ///
    /// Releasing a lock that is free, expired or held by another owner does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns storage errors unchanged.
    pub async fn release(&self, lock_name: &str) -> LockResult<()> {
        if self.store.remove_owned(lock_name, &self.owner_id).await? {
            info!(lock_name, owner_id = %self.owner_id, "Lock released");
        } else {
            debug!(lock_name, owner_id = %self.owner_id, "Lock not held, nothing to release");
        }
        Ok(())
    }

    /// Returns the owner of the live lease on `lock_name`.
    ///
    /// # Errors
    ///
    /// Returns storage errors unchanged.
    pub async fn holder(&self, lock_name: &str) -> LockResult<Option<String>> {
        Ok(self.store.find(lock_name).await?.map(|record| record.owner_id))
    }
}
