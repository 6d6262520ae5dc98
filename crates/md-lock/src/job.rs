//! Periodic jobs that run on at most one node at a time.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use md_core::event::{EventType, MetadataEvent};
use tracing::{debug, warn};

use crate::error::LockResult;
use crate::lock::ClusterLock;

/// How a job invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome<T> {
    /// The job ran and returned a value.
    Completed(T),
    /// A previous invocation on this node is still running.
    AlreadyRunningLocally,
    /// Another node holds the cluster lease.
    HeldElsewhere,
}

impl<T> JobOutcome<T> {
    /// Returns true if the job body ran.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the job's value if it ran.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// A named job guarded twice: an in-process flag stops re-entry on the same
/// node, the [`ClusterLock`] lease stops other nodes.
///
/// The flag is only a fast path. The lease decides.
#[derive(Debug)]
pub struct ExclusiveJob {
    name: String,
    lock: ClusterLock,
    ttl: Duration,
    running: AtomicBool,
}

/// Clears the running flag when the invocation ends, also on panic or
/// cancellation.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExclusiveJob {
    /// Creates a job whose lease lasts `ttl`.
    ///
    /// `ttl` should exceed the longest expected run.
    #[must_use]
    pub fn new(name: impl Into<String>, lock: ClusterLock, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            lock,
            ttl,
            running: AtomicBool::new(false),
        }
    }

    /// Returns the job name, which is also the lock name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true while an invocation runs on this node.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs `body` unless this node or another one is already running the
    /// job.
    ///
    /// The lease is released after the body returns. If releasing fails the
    /// lease simply runs out.
    ///
    /// # Errors
    ///
    /// Returns lock store errors raised while acquiring.
    pub async fn run<F, Fut, T>(&self, body: F) -> LockResult<JobOutcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(job = %self.name, "Job already running on this node");
            self.skipped("running locally");
            return Ok(JobOutcome::AlreadyRunningLocally);
        }
        let _guard = RunningGuard(&self.running);

        if !self.lock.try_acquire(&self.name, self.ttl).await? {
            self.skipped("held elsewhere");
            return Ok(JobOutcome::HeldElsewhere);
        }

        let value = body().await;

        if let Err(err) = self.lock.release(&self.name).await {
            warn!(job = %self.name, error = %err, "Failed to release job lock, lease will expire");
        }
        MetadataEvent::builder(EventType::JobCompleted)
            .actor(self.lock.owner_id())
            .detail("job", self.name.as_str())
            .emit();
        Ok(JobOutcome::Completed(value))
    }

    fn skipped(&self, reason: &str) {
        MetadataEvent::builder(EventType::JobSkipped)
            .actor(self.lock.owner_id())
            .detail("job", self.name.as_str())
            .detail("reason", reason)
            .emit();
    }
}
