//! End-to-End Integration Tests
//!
//! These tests drive the metadata core the way a registry service would:
//! import from XML, store with revisions, diff around pushes and coordinate
//! jobs through cluster leases, all against the shipped schemas and an
//! in-memory store.

mod common;
mod cluster_lock;
mod feed;
mod push_diff;
mod revision_flow;
mod round_trip;
