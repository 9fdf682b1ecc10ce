//! Shared test utilities for integration and scenario tests.
//!
//! This module provides:
//! - Redis testcontainer setup
//! - Mock coordination service recording calls
//! - Target and candidate helpers

#![allow(dead_code)] // Each test binary uses a different subset

pub mod containers;
pub mod mock_coordination;

pub use containers::*;
pub use mock_coordination::*;

use replication_assigner::ReplicationTarget;

pub fn target(peer: &str, table: &str) -> ReplicationTarget {
    ReplicationTarget::new(peer, table)
}

/// Path of a WAL file as a tablet server would write it.
pub fn wal(name: &str) -> String {
    format!("/accumulo/wal/tserver1+9997/{}", name)
}
