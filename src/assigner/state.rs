//! In-memory assignment state.
//!
//! ```text
//! {
//!    peer1 => {sourceTable1 => queue_key1, sourceTable2 => queue_key2, ...}
//!    peer2 => {sourceTable1 => queue_key3, sourceTable3 => queue_key4, ...}
//!    ...
//! }
//! ```
//!
//! At most one key per (peer, table): that single slot is the ordering gate.
//! The state is derived from the coordination service and never persisted.

use crate::queue_key::QueueKey;
use crate::target::{ReplicationTarget, TableId};
use std::collections::HashMap;

/// Outstanding work per (peer, source table).
#[derive(Debug, Default, Clone)]
pub struct AssignmentState {
    by_peer: HashMap<String, HashMap<TableId, QueueKey>>,
    len: usize,
}

impl AssignmentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key outstanding for `target`, if any.
    pub fn get(&self, target: &ReplicationTarget) -> Option<&QueueKey> {
        self.by_peer
            .get(target.peer_name())
            .and_then(|tables| tables.get(target.source_table_id()))
    }

    /// Record `key` for the target it embeds, returning the key it replaced.
    pub fn insert(&mut self, key: QueueKey) -> Option<QueueKey> {
        let target = key.target();
        let previous = self
            .by_peer
            .entry(target.peer_name().to_string())
            .or_default()
            .insert(target.source_table_id().clone(), key);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Clear the slot for `target`. Empty peer maps are pruned.
    pub fn remove(&mut self, target: &ReplicationTarget) -> Option<QueueKey> {
        let tables = self.by_peer.get_mut(target.peer_name())?;
        let removed = tables.remove(target.source_table_id());
        if tables.is_empty() {
            self.by_peer.remove(target.peer_name());
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Clear the slot holding `key`, only if `key` is what it holds.
    pub fn remove_key(&mut self, key: &QueueKey) -> bool {
        if self.get(key.target()) != Some(key) {
            return false;
        }
        self.remove(key.target()).is_some()
    }

    /// Number of (peer, table) pairs with outstanding work.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of peers with any outstanding work.
    pub fn peer_count(&self) -> usize {
        self.by_peer.len()
    }

    /// All outstanding keys.
    pub fn keys(&self) -> impl Iterator<Item = &QueueKey> {
        self.by_peer.values().flat_map(|tables| tables.values())
    }
}
