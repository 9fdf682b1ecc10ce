//! # Replication Assigner
//!
//! Ordered work assignment for shipping write-ahead log files to replication
//! peers.
//!
//! ## Architecture
//!
//! The assigner decides, for each (peer, source table) pair, which file may be
//! shipped next. Work is queued in a coordination service so it survives a
//! restart; completion is observed when the work node disappears.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │                          replication-assigner                             │
//! │                                                                           │
//! │  ┌─────────────────┐   ┌────────────────────────┐   ┌─────────────────┐   │
//! │  │ CandidateSource │──►│ AssignmentDriver       │──►│ WorkAssigner    │   │
//! │  │ (files/targets) │   │ (one pass per tick)    │   │ (ordering gate) │   │
//! │  └─────────────────┘   └────────────────────────┘   └─────────────────┘   │
//! │                                                        │         │        │
//! │                                            add/list    ▼         ▼ read   │
//! │                                          ┌───────────────┐ ┌───────────┐  │
//! │                                          │ WorkQueue     │ │ Coord.    │  │
//! │                                          │               │ │ Store     │  │
//! │                                          └───────────────┘ └───────────┘  │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sequential Assignment
//!
//! At most one file is outstanding per (peer, table). A second file for the
//! same target is refused until the first completes, so peers receive WALs in
//! the order they were offered.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use replication_assigner::{
//!     AssignmentDriver, Candidate, InMemoryCoordination, ReplicationTarget,
//!     SequentialWorkAssigner, AssignerConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AssignerConfig::default();
//!     let backend = Arc::new(InMemoryCoordination::new(config.work_queue.clone()));
//!     let assigner = SequentialWorkAssigner::new(Arc::clone(&backend), Arc::clone(&backend));
//!
//!     let mut driver = AssignmentDriver::new(assigner, config.driver);
//!     let target = ReplicationTarget::new("east", "T1");
//!     let stats = driver
//!         .run_pass(&[Candidate::required("/wal/wal-001", target)])
//!         .await
//!         .expect("assignment state could not be restored");
//!     assert_eq!(stats.queued, 1);
//! }
//! ```

pub mod assigner;
pub mod config;
pub mod coordination;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod queue_key;
pub mod resilience;
pub mod target;

// Re-exports for convenience
pub use assigner::{
    AssignmentState, QueueOutcome, ReconcileStats, RemoveOutcome, SequentialWorkAssigner,
    WorkAssigner,
};
pub use config::{AssignerConfig, DriverConfig, RedisConfig, WorkQueueConfig};
pub use coordination::{
    CachedStore, CoordinationStore, InMemoryCoordination, RedisCoordination, WorkQueue,
};
pub use driver::{AssignmentDriver, Candidate, CandidateSource, DriverState, PassStats};
pub use error::{ReplicationError, Result};
pub use queue_key::QueueKey;
pub use resilience::RetryConfig;
pub use target::{ReplicationTarget, TableId};
