//! Aggregate feed import.

use std::io::BufRead;

use md_core::event::{EventBuilder, EventType, MetadataEvent};
use md_core::AttributeMap;
use md_model::EntityType;
use quick_xml::Reader;
use tracing::{info, warn};

use crate::constants::{element, SamlRole};
use crate::error::{ImportError, ImportResult};
use crate::importer::scan_entity;
use crate::scanner::{EntityScanner, RepeatCounter};
use crate::xml::{self, Token};

/// Outcome counters of a feed import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Entities yielded successfully.
    pub imported: usize,
    /// Entities dropped because of entity-level errors.
    pub skipped: usize,
    /// Envelope error that ended the import early, if any.
    pub failed: Option<String>,
}

impl FeedSummary {
    /// Returns true if the whole feed was read.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed.is_none()
    }

    fn audit(&self, entity_type: EntityType) -> EventBuilder {
        let event = MetadataEvent::builder(EventType::MetadataImported)
            .detail("source", "feed")
            .detail("entity_type", entity_type.as_str())
            .detail("imported", self.imported.to_string())
            .detail("skipped", self.skipped.to_string());
        match &self.failed {
            Some(failed) => event.failure(failed.as_str()),
            None => event,
        }
    }
}

fn skipped_audit(entity_type: EntityType, err: &ImportError) -> EventBuilder {
    MetadataEvent::builder(EventType::FeedEntitySkipped)
        .detail("entity_type", entity_type.as_str())
        .failure(err.to_string())
}

enum Step {
    Entity(ImportResult<AttributeMap>),
    Aborted(ImportError),
    Finished,
}

/// Lazy iterator over the entities of an aggregate feed.
///
/// Each `EntityDescriptor` is copied out of the feed when the iterator
/// advances and parsed on its own, so memory use stays bounded by one
/// entity. Entities that fail to import (malformed markup, missing
/// `entityID`, missing role, undecodable release policy) are logged and
/// skipped. Only an error in the surrounding `EntitiesDescriptor` is yielded;
/// it ends the iteration.
pub struct FeedEntities<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    entity_type: EntityType,
    role: SamlRole,
    counter: RepeatCounter,
    done: bool,
    summary: FeedSummary,
}

impl<R: BufRead> FeedEntities<R> {
    pub(crate) fn new(mut reader: Reader<R>, entity_type: EntityType, role: SamlRole, counter: RepeatCounter) -> Self {
        reader.config_mut().check_end_names = false;
        Self {
            reader,
            buf: Vec::new(),
            entity_type,
            role,
            counter,
            done: false,
            summary: FeedSummary::default(),
        }
    }

    /// Returns the counters so far. Final once the iterator is exhausted.
    #[must_use]
    pub fn summary(&self) -> &FeedSummary {
        &self.summary
    }

    fn scanner(&self) -> EntityScanner {
        EntityScanner::new(self.role, self.counter.clone())
    }

    fn next_step(&mut self) -> Step {
        loop {
            let token = match xml::next_token(&mut self.reader, &mut self.buf) {
                Ok(token) => token,
                Err(err) => return Step::Aborted(err),
            };
            match token {
                Token::Start(el) if el.local == element::ENTITIES_DESCRIPTOR => {}
                Token::Start(el) if el.local == element::ENTITY_DESCRIPTOR => {
                    let entity_id = el.attr("entityID").map(str::to_string);
                    return match xml::capture(&mut self.reader, &el.qname, &mut self.buf) {
                        Ok(subtree) => Step::Entity(self.scan_copy(&subtree, entity_id)),
                        Err(err) => Step::Aborted(err),
                    };
                }
                Token::Empty(el) if el.local == element::ENTITY_DESCRIPTOR => {
                    let entity_id = el.attr("entityID").map(str::to_string);
                    return Step::Entity(self.scanner().finish(entity_id));
                }
                Token::Start(el) => {
                    if let Err(err) = xml::skip(&mut self.reader, &el.qname, &mut self.buf) {
                        return Step::Aborted(err);
                    }
                }
                Token::Eof => return Step::Finished,
                _ => {}
            }
        }
    }

    fn scan_copy(&self, subtree: &[u8], entity_id: Option<String>) -> ImportResult<AttributeMap> {
        let mut reader = xml::reader(subtree);
        let mut buf = Vec::new();
        // The copy starts with the descriptor's own start tag.
        xml::next_token(&mut reader, &mut buf)?;
        scan_entity(&mut reader, &mut buf, self.scanner(), entity_id)
    }

    fn finish(&mut self) {
        self.done = true;
        info!(
            entity_type = %self.entity_type,
            imported = self.summary.imported,
            skipped = self.summary.skipped,
            "Feed import completed"
        );
        self.summary.audit(self.entity_type).emit();
    }
}

impl<R: BufRead> Iterator for FeedEntities<R> {
    type Item = ImportResult<AttributeMap>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.next_step() {
                Step::Finished => self.finish(),
                Step::Entity(Ok(map)) => {
                    self.summary.imported += 1;
                    return Some(Ok(map));
                }
                Step::Entity(Err(err)) => {
                    warn!(error = %err, entity_type = %self.entity_type, "Skipping entity");
                    self.summary.skipped += 1;
                    skipped_audit(self.entity_type, &err).emit();
                }
                Step::Aborted(err) => {
                    warn!(error = %err, imported = self.summary.imported, "Feed import aborted");
                    self.summary.failed = Some(err.to_string());
                    self.finish();
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
