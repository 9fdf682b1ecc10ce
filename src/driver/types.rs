//! Driver state and pass types.
//!
//! # State Transitions
//!
//! ```text
//!                  run()
//! Created ───────────────────→ Running
//!                                 │
//!                   ┌─────────────┴─────────────┐
//!       (shutdown signal)              (fatal startup error)
//!                   ↓                           ↓
//!              ShuttingDown                  Failed
//!                   │
//!                   ↓
//!                Stopped
//! ```

use crate::assigner::ReconcileStats;
use crate::target::ReplicationTarget;
use std::path::PathBuf;

/// State of the assignment driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Driver created but not started.
    ///
    /// Call [`run()`](super::AssignmentDriver::run) to begin assigning work.
    Created,

    /// Running one assignment pass per tick.
    Running,

    /// Shutdown signal seen; the current pass has finished.
    ShuttingDown,

    /// Stopped cleanly. Safe to drop.
    Stopped,

    /// The assignment state could not be restored. The driver cannot continue.
    Failed,
}

impl std::fmt::Display for DriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverState::Created => write!(f, "Created"),
            DriverState::Running => write!(f, "Running"),
            DriverState::ShuttingDown => write!(f, "ShuttingDown"),
            DriverState::Stopped => write!(f, "Stopped"),
            DriverState::Failed => write!(f, "Failed"),
        }
    }
}

/// A file that may need shipping to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub file: PathBuf,
    pub target: ReplicationTarget,
    /// `false` once the file no longer needs replicating to the target.
    pub work_required: bool,
}

impl Candidate {
    /// A file that still has to be shipped.
    pub fn required(file: impl Into<PathBuf>, target: ReplicationTarget) -> Self {
        Self {
            file: file.into(),
            target,
            work_required: true,
        }
    }

    /// A file that has been fully replicated to the target.
    pub fn completed(file: impl Into<PathBuf>, target: ReplicationTarget) -> Self {
        Self {
            file: file.into(),
            target,
            work_required: false,
        }
    }
}

/// Statistics from one assignment pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// Candidates looked at
    pub offered: usize,
    /// Work newly queued
    pub queued: usize,
    /// Offers for a file that was already outstanding
    pub already_queued: usize,
    /// Offers refused because another file is outstanding for the target
    pub blocked: usize,
    /// Offers the work queue did not accept
    pub failed: usize,
    /// Offers that can never be queued, such as a file name containing `|`
    pub rejected: usize,
    /// Outstanding work dropped because it is no longer required
    pub removed: usize,
    /// Required candidates not offered because the backlog was full
    pub skipped_full: usize,
    /// Result of the reconciliation at the end of the pass
    pub reconcile: ReconcileStats,
}
