//! Delivery of delta sets to downstream consumers.

use std::collections::BTreeSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::delta::Delta;
use crate::error::PushResult;

/// Receives the deltas of a push.
///
/// Implementations might e-mail administrators or post to a chat channel;
/// the differ only calls [`send`](Self::send) for non-empty sets.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one delta set.
    ///
    /// ## Errors
    ///
    /// Returns [`crate::PushError::Notification`] if delivery failed.
    async fn send(&self, deltas: &BTreeSet<Delta>) -> PushResult<()>;
}

/// Writes every delta to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, deltas: &BTreeSet<Delta>) -> PushResult<()> {
        for delta in deltas {
            info!(
                entity_id = %delta.entity_id,
                attribute = %delta.attribute,
                pre = %delta.pre_push_value,
                post = %delta.post_push_value,
                "Attribute changed by push"
            );
        }
        Ok(())
    }
}

/// Keeps every delivered set in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    batches: Mutex<Vec<BTreeSet<Delta>>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the delivered sets in order.
    #[must_use]
    pub fn batches(&self) -> Vec<BTreeSet<Delta>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for CollectingSink {
    async fn send(&self, deltas: &BTreeSet<Delta>) -> PushResult<()> {
        self.batches.lock().push(deltas.clone());
        Ok(())
    }
}
