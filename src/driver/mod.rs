// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Assignment driver.
//!
//! Holds a [`WorkAssigner`] and calls it once per tick:
//!
//! 1. `initialize_state` (a no-op after the first successful call)
//! 2. create work from the current candidates
//! 3. `reconcile` against the coordination service
//!
//! Candidates come from a [`CandidateSource`]: whatever tracks which files
//! still need shipping to which targets. The driver never decides ordering
//! itself; that is the assigner's policy.

mod types;

pub use types::{Candidate, DriverState, PassStats};

use crate::assigner::{QueueOutcome, WorkAssigner};
use crate::config::DriverConfig;
use crate::coordination::AdapterFuture;
use crate::error::{ReplicationError, Result};
use crate::metrics;
use crate::queue_key::QueueKey;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, warn, Instrument};

/// Supplies the files to consider on each pass.
pub trait CandidateSource: Send + Sync + 'static {
    fn candidates(&self) -> AdapterFuture<'_, Vec<Candidate>>;
}

/// Runs assignment passes for a single [`WorkAssigner`].
///
/// The driver owns the assigner, so there is exactly one caller of its
/// mutating operations.
pub struct AssignmentDriver<A: WorkAssigner> {
    assigner: A,
    config: DriverConfig,
    state_tx: watch::Sender<DriverState>,
    state_rx: watch::Receiver<DriverState>,
}

impl<A: WorkAssigner> AssignmentDriver<A> {
    /// The driver starts in `Created`. Call [`run()`](Self::run) to start ticking,
    /// or drive passes by hand with [`run_pass()`](Self::run_pass).
    pub fn new(assigner: A, config: DriverConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(DriverState::Created);
        Self {
            assigner,
            config,
            state_tx,
            state_rx,
        }
    }

    pub fn state(&self) -> DriverState {
        *self.state_rx.borrow()
    }

    pub fn state_receiver(&self) -> watch::Receiver<DriverState> {
        self.state_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), DriverState::Running)
    }

    pub fn assigner(&self) -> &A {
        &self.assigner
    }

    pub fn assigner_mut(&mut self) -> &mut A {
        &mut self.assigner
    }

    pub fn into_assigner(self) -> A {
        self.assigner
    }

    fn set_state(&self, state: DriverState) {
        let _ = self.state_tx.send(state);
        metrics::set_driver_state(&state.to_string());
    }

    /// Run one assignment pass over `candidates`.
    ///
    /// Fails only when the assignment state cannot be restored; every other
    /// failure is counted in the returned stats and retried next pass.
    pub async fn run_pass(&mut self, candidates: &[Candidate]) -> Result<PassStats> {
        let start = Instant::now();

        self.assigner.initialize_state().await?;

        let mut stats = PassStats::default();
        self.create_work(candidates, &mut stats).await;
        stats.reconcile = self.assigner.reconcile().await;

        metrics::record_assignment_pass(stats.queued, start.elapsed());
        debug!(
            offered = stats.offered,
            queued = stats.queued,
            blocked = stats.blocked,
            failed = stats.failed,
            rejected = stats.rejected,
            removed = stats.removed + stats.reconcile.removed,
            outstanding = self.assigner.size(),
            "Assignment pass complete"
        );
        Ok(stats)
    }

    async fn create_work(&mut self, candidates: &[Candidate], stats: &mut PassStats) {
        let max_queue_size = self.config.max_queue_size;

        for candidate in candidates {
            if !candidate.work_required {
                stats.offered += 1;
                if self.complete_if_outstanding(candidate) {
                    stats.removed += 1;
                }
                continue;
            }

            if self.assigner.size() >= max_queue_size {
                stats.skipped_full += 1;
                continue;
            }

            stats.offered += 1;
            match self
                .assigner
                .queue_work(&candidate.file, &candidate.target)
                .await
            {
                QueueOutcome::Queued(_) => stats.queued += 1,
                QueueOutcome::AlreadyQueued => stats.already_queued += 1,
                QueueOutcome::Blocked { .. } => stats.blocked += 1,
                QueueOutcome::Failed => stats.failed += 1,
                QueueOutcome::Rejected => stats.rejected += 1,
            }
        }

        if stats.skipped_full > 0 {
            info!(
                outstanding = self.assigner.size(),
                max_queue_size,
                skipped = stats.skipped_full,
                "Work queue is full, deferring remaining candidates"
            );
            metrics::record_backlog_full(stats.skipped_full);
        }
    }

    /// Drop the outstanding work for a candidate that no longer needs shipping.
    fn complete_if_outstanding(&mut self, candidate: &Candidate) -> bool {
        let Ok(queue_key) = QueueKey::for_file(&candidate.file, &candidate.target) else {
            return false;
        };
        if !self.assigner.queued_for(&candidate.target).contains(&queue_key) {
            return false;
        }
        self.assigner
            .remove_completed(&candidate.target, &queue_key)
            .is_removed()
    }

    /// Run passes every `assign_interval` until `shutdown_rx` carries `true`.
    ///
    /// A pass that cannot restore the assignment state moves the driver to
    /// `Failed` and returns the error. A candidate source failure only skips
    /// work creation for that tick.
    pub async fn run<C: CandidateSource>(
        &mut self,
        source: &C,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<()> {
        if self.state() != DriverState::Created {
            return Err(ReplicationError::InvalidState {
                expected: "Created".to_string(),
                actual: self.state().to_string(),
            });
        }

        let span = tracing::info_span!("assignment_driver", assigner = self.assigner.name());
        self.run_loop(source, shutdown_rx).instrument(span).await
    }

    async fn run_loop<C: CandidateSource>(
        &mut self,
        source: &C,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<()> {
        let interval = self.config.assign_interval_duration();
        info!(
            interval_ms = interval.as_millis() as u64,
            max_queue_size = self.config.max_queue_size,
            "Starting assignment driver"
        );
        self.set_state(DriverState::Running);

        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // Mark the current value as seen so changed() only fires on actual changes
        let mut stopping = *shutdown_rx.borrow_and_update();

        while !stopping {
            tokio::select! {
                biased;

                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping assignment driver");
                        stopping = true;
                    }
                    continue;
                }

                _ = timer.tick() => {}
            }

            let candidates = match source.candidates().await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(error = %e, "Could not gather replication candidates");
                    Vec::new()
                }
            };

            if let Err(e) = self.run_pass(&candidates).await {
                error!(error = %e, "Assignment pass failed, driver cannot continue");
                self.set_state(DriverState::Failed);
                return Err(e);
            }
        }

        self.set_state(DriverState::ShuttingDown);
        self.set_state(DriverState::Stopped);
        info!(outstanding = self.assigner.size(), "Assignment driver stopped");
        Ok(())
    }
}
