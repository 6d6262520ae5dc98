//! # md-lock
//!
//! Coordination of periodic work across nodes.
//!
//! - [`ClusterLock`] - named leases taken by one atomic insert into a shared
//!   [`md_storage::LockStore`], expiring after their TTL
//! - [`ExclusiveJob`] - a job runner combining an in-process guard with the
//!   cluster lease
//!
//! ```ignore
//! let lock = ClusterLock::from_config(store, &config.lock);
//! let job = ExclusiveJob::new("metadata-push", lock, config.lock.default_ttl());
//! match job.run(|| push_all()).await? {
//!     JobOutcome::Completed(report) => info!(?report, "Push finished"),
//!     _ => {}
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod job;
pub mod lock;

pub use error::{LockError, LockResult};
pub use job::{ExclusiveJob, JobOutcome};
pub use lock::ClusterLock;
