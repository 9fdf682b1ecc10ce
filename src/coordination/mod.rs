// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Coordination service adapters.
//!
//! The assigner talks to the coordination service through two narrow traits:
//!
//! - [`WorkQueue`]: enqueue a work item, list the items still queued
//! - [`CoordinationStore`]: read a node; absence means the work finished
//!
//! Both are usually implemented by the same backend. Provided backends:
//!
//! - [`InMemoryCoordination`]: process-local, for standalone mode and tests
//! - [`RedisCoordination`]: Redis-backed, queue directory is a SET and each
//!   work item a string key at its node path
//! - [`CachedStore`]: read-through TTL cache over any [`CoordinationStore`]
//!
//! # Example
//!
//! ```rust
//! use replication_assigner::coordination::{AdapterFuture, CoordinationStore};
//!
//! struct AlwaysDone;
//!
//! impl CoordinationStore for AlwaysDone {
//!     fn read(&self, _path: &str) -> AdapterFuture<'_, Option<Vec<u8>>> {
//!         Box::pin(async { Ok(None) })
//!     }
//! }
//! ```

mod cache;
mod memory;
mod redis_store;

pub use cache::CachedStore;
pub use memory::InMemoryCoordination;
pub use redis_store::RedisCoordination;

use crate::error::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Boxed future returned by adapter calls.
pub type AdapterFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// Persistent work queue built on the coordination service.
///
/// Errors are [`Coordination`](crate::ReplicationError::Coordination) or
/// [`Interrupted`](crate::ReplicationError::Interrupted); both are transient
/// from the assigner's point of view.
pub trait WorkQueue: Send + Sync + 'static {
    /// Enqueue `payload` under `queue_key`.
    ///
    /// Enqueuing a key that is already queued leaves the existing item as is.
    fn add_work(&self, queue_key: &str, payload: &str) -> AdapterFuture<'_, ()>;

    /// List the keys of all work currently queued.
    fn list_queued(&self) -> AdapterFuture<'_, Vec<String>>;

    /// Node path this queue writes the work item for `queue_key` to.
    ///
    /// Completion checks read this path from the [`CoordinationStore`], so
    /// the node layout has a single owner.
    fn work_path(&self, queue_key: &str) -> String;
}

/// Read access to coordination service nodes.
pub trait CoordinationStore: Send + Sync + 'static {
    /// Read the data at `path`, `None` if the node does not exist.
    fn read(&self, path: &str) -> AdapterFuture<'_, Option<Vec<u8>>>;
}

impl<T: WorkQueue + ?Sized> WorkQueue for Arc<T> {
    fn add_work(&self, queue_key: &str, payload: &str) -> AdapterFuture<'_, ()> {
        (**self).add_work(queue_key, payload)
    }

    fn list_queued(&self) -> AdapterFuture<'_, Vec<String>> {
        (**self).list_queued()
    }

    fn work_path(&self, queue_key: &str) -> String {
        (**self).work_path(queue_key)
    }
}

impl<T: CoordinationStore + ?Sized> CoordinationStore for Arc<T> {
    fn read(&self, path: &str) -> AdapterFuture<'_, Option<Vec<u8>>> {
        (**self).read(path)
    }
}
