//! Attribute-level comparison of pre/post push snapshots.

use std::collections::BTreeSet;
use std::sync::Arc;

use md_core::event::{EventType, MetadataEvent};
use md_core::{values_equivalent, Value};
use tracing::debug;

use crate::delta::Delta;
use crate::error::PushResult;
use crate::sink::NotificationSink;
use crate::snapshot::PushSnapshot;

/// Diffs snapshots and forwards the changes to a sink.
#[derive(Clone)]
pub struct PushDiffer {
    sink: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for PushDiffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushDiffer").finish_non_exhaustive()
    }
}

impl PushDiffer {
    /// Creates a differ delivering to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Returns every attribute whose value differs between `pre` and `post`.
    ///
    /// Records are matched on entity id and type; a record without a match
    /// is compared against an empty one. Strings that differ only in
    /// surrounding whitespace are equal. Each delta's `post_push_value`
    /// comes from `post`.
    #[must_use]
    pub fn compare(pre: &PushSnapshot, post: &PushSnapshot) -> BTreeSet<Delta> {
        let mut deltas = BTreeSet::new();
        collect(pre, post, false, &mut deltas);
        collect(post, pre, true, &mut deltas);
        deltas
    }

    /// Compares the snapshots and sends a non-empty result to the sink.
    ///
    /// # Errors
    ///
    /// Returns the sink's error. The deltas are lost to the caller in that
    /// case; recompute them with [`compare`](Self::compare) to retry.
    pub async fn push(&self, pre: &PushSnapshot, post: &PushSnapshot) -> PushResult<BTreeSet<Delta>> {
        let deltas = Self::compare(pre, post);
        let entities: BTreeSet<&str> = deltas.iter().map(|delta| delta.entity_id.as_str()).collect();
        MetadataEvent::builder(EventType::PushDiffComputed)
            .detail("deltas", deltas.len().to_string())
            .detail("entities", entities.len().to_string())
            .emit();
        if deltas.is_empty() {
            debug!("Push changed nothing, no notification sent");
            return Ok(deltas);
        }
        self.sink.send(&deltas).await?;
        Ok(deltas)
    }
}

fn collect(baseline: &PushSnapshot, other: &PushSnapshot, reversed: bool, deltas: &mut BTreeSet<Delta>) {
    for record in baseline.records() {
        let counterpart = other.find(record);
        for (attribute, value) in &record.attributes {
            let other_value = counterpart
                .and_then(|counterpart| counterpart.get(attribute))
                .unwrap_or(&Value::Null);
            if values_equivalent(value, other_value) {
                continue;
            }
            let (pre, post) = if reversed {
                (other_value.clone(), value.clone())
            } else {
                (value.clone(), other_value.clone())
            };
            deltas.insert(Delta::new(record.entity_id.clone(), attribute.clone(), pre, post));
        }
    }
}
