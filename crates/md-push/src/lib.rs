//! # md-push
//!
//! Change detection around a push to a downstream consumer.
//!
//! A push is bracketed by two [`PushSnapshot`]s of flat attribute records.
//! [`PushDiffer::compare`] reduces them to a set of [`Delta`]s, one per
//! changed `(entity_id, attribute)` pair, and [`PushDiffer::push`] hands a
//! non-empty set to a [`NotificationSink`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod delta;
pub mod differ;
pub mod error;
pub mod sink;
pub mod snapshot;

pub use delta::Delta;
pub use differ::PushDiffer;
pub use error::{PushError, PushResult};
pub use sink::{CollectingSink, LogSink, NotificationSink};
pub use snapshot::{PushRecord, PushSnapshot};
