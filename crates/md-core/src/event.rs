//! Audit events for metadata lifecycle changes.
//!
//! Every event records when it happened, what kind of change it was, which
//! entity it concerned, who caused it and whether it succeeded. Events are
//! written to the `md_audit` tracing target by [`MetadataEvent::emit`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Revision events
    /// A new entity was stored with its root revision.
    EntityCreated,
    /// A new revision was written for an existing entity.
    RevisionCreated,
    /// A historical revision was reinstated as latest.
    RevisionRestored,
    /// An entity was removed.
    EntityDeleted,

    // Import events
    /// An XML or JSON document was imported.
    MetadataImported,
    /// An entity in an aggregate feed was skipped.
    FeedEntitySkipped,

    // Push events
    /// Differences between two push snapshots were computed.
    PushDiffComputed,

    // Job events
    /// A periodic job ran on this node.
    JobCompleted,
    /// A periodic job was skipped because another run holds the lease.
    JobSkipped,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// An audit record for a metadata change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEvent {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Document identifier the event concerns.
    pub entity_id: Option<String>,

    /// Entity type (`saml20_sp`, ...).
    pub entity_type: Option<String>,

    /// Actor responsible for the change.
    pub actor: Option<String>,

    /// Error message (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl MetadataEvent {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Writes the event to the audit tracing target.
    pub fn emit(&self) {
        let details = self
            .details
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        match self.outcome {
            EventOutcome::Success => tracing::info!(
                target: "md_audit",
                event_id = %self.id,
                event_type = ?self.event_type,
                entity_id = self.entity_id.as_deref().unwrap_or("-"),
                entity_type = self.entity_type.as_deref().unwrap_or("-"),
                actor = self.actor.as_deref().unwrap_or("-"),
                %details,
                "audit"
            ),
            EventOutcome::Failure => tracing::warn!(
                target: "md_audit",
                event_id = %self.id,
                event_type = ?self.event_type,
                entity_id = self.entity_id.as_deref().unwrap_or("-"),
                entity_type = self.entity_type.as_deref().unwrap_or("-"),
                actor = self.actor.as_deref().unwrap_or("-"),
                error = self.error.as_deref().unwrap_or("-"),
                %details,
                "audit"
            ),
        }
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    entity_id: Option<String>,
    entity_type: Option<String>,
    actor: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            entity_id: None,
            entity_type: None,
            actor: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the entity the event concerns.
    #[must_use]
    pub fn entity(mut self, id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Sets the actor.
    #[must_use]
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> MetadataEvent {
        MetadataEvent {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            entity_id: self.entity_id,
            entity_type: self.entity_type,
            actor: self.actor,
            error: self.error,
            details: self.details,
        }
    }

    /// Builds and emits the event, returning it.
    pub fn emit(self) -> MetadataEvent {
        let event = self.build();
        event.emit();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_creates_success_event() {
        let event = MetadataEvent::builder(EventType::RevisionCreated)
            .entity("0b5a", "saml20_sp")
            .actor("jdoe")
            .detail("revision", "3")
            .build();

        assert_eq!(event.event_type, EventType::RevisionCreated);
        assert_eq!(event.outcome, EventOutcome::Success);
        assert_eq!(event.entity_id.as_deref(), Some("0b5a"));
        assert_eq!(event.entity_type.as_deref(), Some("saml20_sp"));
        assert_eq!(event.details, vec![("revision".to_string(), "3".to_string())]);
        assert!(event.error.is_none());
    }

    #[test]
    fn builder_creates_failure_event() {
        let event = MetadataEvent::builder(EventType::FeedEntitySkipped)
            .failure("missing entityID")
            .emit();

        assert_eq!(event.outcome, EventOutcome::Failure);
        assert_eq!(event.error.as_deref(), Some("missing entityID"));
    }

    #[test]
    fn event_has_timestamp() {
        let before = Utc::now();
        let event = MetadataEvent::builder(EventType::JobCompleted).build();
        let after = Utc::now();

        assert!(event.timestamp >= before);
        assert!(event.timestamp <= after);
    }
}
