// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Queue key codec.
//!
//! Every queued unit of work is named by a key that embeds the file being
//! shipped and the target it is shipped to:
//!
//! ```text
//! wal-001|east|T1
//! ───┬─── ─┬── ┬─
//!    │     │   └── source table id
//!    │     └────── peer name
//!    └──────────── file name
//! ```
//!
//! The key is the name of the work node in the coordination service, so the
//! assigner can rebuild its in-memory state after a restart by parsing the
//! names of the nodes still queued. Components must not be empty and must
//! not contain the separator; [`QueueKey::new`] enforces this so that every
//! key it produces parses back to the same (file, target) pair.

use crate::error::{ReplicationError, Result};
use crate::target::{ReplicationTarget, TableId};
use std::fmt;
use std::path::Path;

/// Separator between the components of a queue key.
pub const KEY_SEPARATOR: char = '|';

/// Opaque identifier of one queued (file, target) unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueKey {
    encoded: String,
    file_name: String,
    target: ReplicationTarget,
}

impl QueueKey {
    /// Build the key for shipping `file_name` to `target`.
    pub fn new(file_name: &str, target: &ReplicationTarget) -> Result<Self> {
        let components = [
            ("file name", file_name),
            ("peer name", target.peer_name()),
            ("source table id", target.source_table_id().as_str()),
        ];
        for (label, value) in components {
            if value.is_empty() {
                return Err(invalid(value, format!("{} is empty", label)));
            }
            if value.contains(KEY_SEPARATOR) {
                return Err(invalid(
                    value,
                    format!("{} contains separator '{}'", label, KEY_SEPARATOR),
                ));
            }
        }

        let encoded = format!(
            "{}{sep}{}{sep}{}",
            file_name,
            target.peer_name(),
            target.source_table_id(),
            sep = KEY_SEPARATOR
        );

        Ok(Self {
            encoded,
            file_name: file_name.to_string(),
            target: target.clone(),
        })
    }

    /// Build the key for shipping the file at `path` to `target`.
    ///
    /// Only the final path component is part of the key.
    pub fn for_file(path: &Path, target: &ReplicationTarget) -> Result<Self> {
        let file_name = file_name_of(path).ok_or_else(|| {
            invalid(
                &path.to_string_lossy(),
                "path has no UTF-8 file name",
            )
        })?;
        Self::new(file_name, target)
    }

    /// Parse a key produced by [`QueueKey::new`].
    pub fn parse(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(invalid(
                key,
                format!("expected 3 components, found {}", parts.len()),
            ));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid(key, "empty component"));
        }

        Ok(Self {
            encoded: key.to_string(),
            file_name: parts[0].to_string(),
            target: ReplicationTarget::new(parts[1], TableId::new(parts[2])),
        })
    }

    /// Name of the file this work ships.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Where the file is shipped.
    pub fn target(&self) -> &ReplicationTarget {
        &self.target
    }

    /// The encoded form, as stored in the coordination service.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Final component of `path`, if it is valid UTF-8.
pub fn file_name_of(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn invalid(key: &str, reason: impl Into<String>) -> ReplicationError {
    ReplicationError::InvalidQueueKey {
        key: key.to_string(),
        reason: reason.into(),
    }
}
