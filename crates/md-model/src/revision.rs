//! Revision bookkeeping.
//!
//! A revision chain is a sequence of snapshots of one entity connected by
//! `parent_id` back-references. The number increases monotonically along
//! the chain; `terminated` is set exactly when a revision is superseded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor recorded for revisions materialized without a user.
pub const SYSTEM_ACTOR: &str = "system";

/// Lifecycle state of a document, derived from its revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Revision number 0 without a parent.
    Draft,
    /// The current, untouched revision.
    Latest,
    /// A superseded snapshot.
    Historical,
}

/// Revision of a metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Position in the chain.
    pub number: u64,
    /// When this revision was created.
    pub created: DateTime<Utc>,
    /// Identifier of the document this snapshot was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Actor who created this revision.
    pub updated_by: String,
    /// When this revision was superseded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<DateTime<Utc>>,
}

impl Revision {
    /// Creates a root revision (number 0, no parent).
    #[must_use]
    pub fn root(actor: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            number: 0,
            created,
            parent_id: None,
            updated_by: actor.into(),
            terminated: None,
        }
    }

    /// Creates the revision following `previous`.
    #[must_use]
    pub fn successor(previous: &Self, actor: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            number: previous.number + 1,
            created,
            parent_id: None,
            updated_by: actor.into(),
            terminated: None,
        }
    }

    /// Returns the lifecycle state this revision denotes.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        if self.terminated.is_some() {
            LifecycleState::Historical
        } else if self.number == 0 && self.parent_id.is_none() {
            LifecycleState::Draft
        } else {
            LifecycleState::Latest
        }
    }

    /// Returns true if this revision starts its chain.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_revision_is_draft() {
        let revision = Revision::root("jdoe", Utc::now());
        assert_eq!(revision.number, 0);
        assert!(revision.is_root());
        assert_eq!(revision.state(), LifecycleState::Draft);
    }

    #[test]
    fn successor_increments_number() {
        let root = Revision::root("jdoe", Utc::now());
        let next = Revision::successor(&root, "asmith", Utc::now());
        assert_eq!(next.number, 1);
        assert_eq!(next.updated_by, "asmith");
        assert_eq!(next.state(), LifecycleState::Latest);
    }

    #[test]
    fn terminated_revision_is_historical() {
        let mut revision = Revision::root("jdoe", Utc::now());
        revision.terminated = Some(Utc::now());
        assert_eq!(revision.state(), LifecycleState::Historical);
    }

    #[test]
    fn serializes_camel_case_without_empty_options() {
        let revision = Revision::root("jdoe", Utc::now());
        let json = serde_json::to_value(&revision).unwrap();
        assert!(json.get("updatedBy").is_some());
        assert!(json.get("parentId").is_none());
        assert!(json.get("terminated").is_none());
    }
}
