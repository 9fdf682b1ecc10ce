//! Replication destinations.
//!
//! A [`ReplicationTarget`] names where a file is shipped: a peer cluster and
//! the source table whose writes the file carries. Ordering is enforced per
//! target, so the pair is used as a map key throughout the assigner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a table on the originating cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TableId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Destination of one replication stream: (peer, source table).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicationTarget {
    peer_name: String,
    source_table_id: TableId,
}

impl ReplicationTarget {
    pub fn new(peer_name: impl Into<String>, source_table_id: impl Into<TableId>) -> Self {
        Self {
            peer_name: peer_name.into(),
            source_table_id: source_table_id.into(),
        }
    }

    /// Name of the remote cluster receiving the data.
    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }

    /// Table on this cluster whose writes are replicated.
    pub fn source_table_id(&self) -> &TableId {
        &self.source_table_id
    }
}

impl fmt::Display for ReplicationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.peer_name, self.source_table_id)
    }
}
