// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Work assignment.
//!
//! A [`WorkAssigner`] decides which file may be shipped to which target and
//! keeps the bookkeeping for work in flight. The driver holds one and calls
//! it every tick; any scheduling policy implements the same trait.
//!
//! # Per-target lifecycle
//!
//! ```text
//!              queue_work()
//!     Idle ────────────────────→ Queued
//!       ↑                          │
//!       └──────────────────────────┘
//!     remove_completed() with the recorded key,
//!     or reconcile() seeing the work node gone
//! ```
//!
//! No other transitions exist. Queuing while `Queued` is refused, and a
//! completion carrying a different key leaves the target `Queued`.

mod sequential;
mod state;

pub use sequential::SequentialWorkAssigner;
pub use state::AssignmentState;

use crate::error::Result;
use crate::queue_key::QueueKey;
use crate::target::ReplicationTarget;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::path::Path;

/// The capability a driver uses to assign replication work.
///
/// Methods take `&mut self` where they change state, so a single driver
/// owns the assigner; sharing one across tasks needs an external lock.
pub trait WorkAssigner: Send {
    /// Human-readable name of the policy.
    fn name(&self) -> &str;

    /// Rebuild the assignment state from work already queued.
    ///
    /// Idempotent. An error is fatal: the driver must not continue.
    fn initialize_state(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Whether `target` has no work outstanding.
    fn should_queue(&self, target: &ReplicationTarget) -> bool;

    /// Try to queue `file` for `target`.
    fn queue_work<'a>(
        &'a mut self,
        file: &'a Path,
        target: &'a ReplicationTarget,
    ) -> BoxFuture<'a, QueueOutcome>;

    /// Keys outstanding for `target`.
    fn queued_for(&self, target: &ReplicationTarget) -> HashSet<QueueKey>;

    /// Mark `queue_key` as completed for `target`.
    fn remove_completed(&mut self, target: &ReplicationTarget, queue_key: &QueueKey)
        -> RemoveOutcome;

    /// Drop outstanding work whose node no longer exists in the coordination service.
    fn reconcile(&mut self) -> BoxFuture<'_, ReconcileStats>;

    /// Number of targets with work outstanding.
    fn size(&self) -> usize;
}

/// Result of [`WorkAssigner::queue_work`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueOutcome {
    /// The work was enqueued and recorded.
    Queued(QueueKey),
    /// The same file is already outstanding for the target.
    AlreadyQueued,
    /// A different file is outstanding for the target and must finish first.
    Blocked { outstanding: QueueKey },
    /// The work queue did not accept the work; retry on a later pass.
    Failed,
    /// No queue key can be built for the file and target. Offering the
    /// same pair again gives the same answer.
    Rejected,
}

impl QueueOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }

    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued(_) => "queued",
            Self::AlreadyQueued => "already_queued",
            Self::Blocked { .. } => "blocked",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }
}

/// Result of [`WorkAssigner::remove_completed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The recorded key matched and the target is idle again.
    Removed,
    /// Nothing was outstanding for the target.
    NotQueued,
    /// A different key is recorded; the state was left unchanged.
    Mismatch { recorded: QueueKey },
}

impl RemoveOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed)
    }
}

/// Statistics from a reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Outstanding keys probed
    pub checked: usize,
    /// Keys whose node was gone and were removed
    pub removed: usize,
    /// Probes that failed and will be retried next pass
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> QueueKey {
        QueueKey::new("wal-001", &ReplicationTarget::new("east", "T1")).unwrap()
    }

    #[test]
    fn test_queue_outcome_labels() {
        assert_eq!(QueueOutcome::Queued(key()).label(), "queued");
        assert_eq!(QueueOutcome::AlreadyQueued.label(), "already_queued");
        assert_eq!(QueueOutcome::Blocked { outstanding: key() }.label(), "blocked");
        assert_eq!(QueueOutcome::Failed.label(), "failed");
        assert_eq!(QueueOutcome::Rejected.label(), "rejected");
    }

    #[test]
    fn test_only_queued_counts_as_queued() {
        assert!(QueueOutcome::Queued(key()).is_queued());
        assert!(!QueueOutcome::AlreadyQueued.is_queued());
        assert!(!QueueOutcome::Blocked { outstanding: key() }.is_queued());
        assert!(!QueueOutcome::Failed.is_queued());
        assert!(!QueueOutcome::Rejected.is_queued());
    }

    #[test]
    fn test_remove_outcome() {
        assert!(RemoveOutcome::Removed.is_removed());
        assert!(!RemoveOutcome::NotQueued.is_removed());
        assert!(!RemoveOutcome::Mismatch { recorded: key() }.is_removed());
    }
}
