// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Sequential work assignment.
//!
//! Creates work in the coordination service as
//! `file|peer|table => path`, but ships files to each (peer, table) in the
//! order they were offered: while one file is outstanding for a target, no
//! other file for that target is queued. This keeps WALs replayed on the peer
//! in the same order they were applied on this cluster.
//!
//! # Algorithm
//!
//! For `queue_work(file, target)`:
//!
//! 1. Nothing outstanding for the target → enqueue, record the key
//! 2. The same file is outstanding → nothing to do (duplicate offer)
//! 3. A different file is outstanding → refuse, `file` waits its turn
//!
//! A file that cannot be keyed (no file name, or `|` in a component) is
//! rejected before any of this.
//!
//! A target becomes idle again when the driver confirms completion with the
//! recorded key, or when reconciliation finds the work node gone.

use super::{AssignmentState, QueueOutcome, ReconcileStats, RemoveOutcome, WorkAssigner};
use crate::coordination::{CoordinationStore, WorkQueue};
use crate::error::{ReplicationError, Result};
use crate::metrics;
use crate::queue_key::{file_name_of, QueueKey};
use crate::target::ReplicationTarget;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn, Instrument, Span};

const NAME: &str = "Sequential Work Assigner";

/// Assigns at most one outstanding file per (peer, source table).
///
/// # Logging
///
/// All events are emitted inside the span given at construction
/// ([`with_span`](Self::with_span)); [`new`](Self::new) uses an
/// `info_span!("work_assigner")`.
pub struct SequentialWorkAssigner<Q, S> {
    work_queue: Arc<Q>,
    store: Arc<S>,
    state: AssignmentState,
    initialized: bool,
    span: Span,
}

impl<Q: WorkQueue, S: CoordinationStore> SequentialWorkAssigner<Q, S> {
    /// `store` must serve the nodes `work_queue` writes: completion is
    /// checked by reading [`WorkQueue::work_path`] from it.
    pub fn new(work_queue: Arc<Q>, store: Arc<S>) -> Self {
        let span = tracing::info_span!("work_assigner", assigner = NAME);
        Self::with_span(work_queue, store, span)
    }

    pub fn with_span(work_queue: Arc<Q>, store: Arc<S>, span: Span) -> Self {
        Self {
            work_queue,
            store,
            state: AssignmentState::new(),
            initialized: false,
            span,
        }
    }

    /// Start from a known state instead of restoring it.
    ///
    /// The state counts as initialized; `initialize_state` will not list
    /// the queue.
    pub fn with_state(mut self, state: AssignmentState) -> Self {
        self.state = state;
        self.initialized = true;
        self
    }

    pub fn state(&self) -> &AssignmentState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    async fn restore(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let existing = self.work_queue.list_queued().await.map_err(|e| {
            error!(error = %e, "Error reading existing queued replication work");
            ReplicationError::startup(e)
        })?;

        info!(
            count = existing.len(),
            "Restoring replication work queue state from coordination service"
        );

        // Parse everything before touching the state so a bad key leaves it as it was
        let keys = existing
            .iter()
            .map(|work| QueueKey::parse(work))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                error!(error = %e, "Unparseable key in replication work queue");
                ReplicationError::startup(e)
            })?;

        let restored = keys.len();
        for key in keys {
            debug!(
                file = key.file_name(),
                table = %key.target().source_table_id(),
                peer = key.target().peer_name(),
                "In progress replication"
            );
            let listed = key.clone();
            if let Some(previous) = self.state.insert(key) {
                warn!(
                    target = %listed.target(),
                    kept = %listed,
                    replaced = %previous,
                    "Multiple queued work items for one target"
                );
            }
        }

        self.initialized = true;
        metrics::record_state_restored(restored);
        metrics::set_outstanding_work(self.state.len());
        Ok(())
    }

    async fn try_queue(&mut self, file: &Path, target: &ReplicationTarget) -> QueueOutcome {
        let outcome = self.decide(file, target).await;
        metrics::record_queue_attempt(target.peer_name(), outcome.label());
        metrics::set_outstanding_work(self.state.len());
        outcome
    }

    async fn decide(&mut self, file: &Path, target: &ReplicationTarget) -> QueueOutcome {
        let Some(file_name) = file_name_of(file) else {
            error!(file = %file.display(), %target, "Cannot queue work for a path without a file name");
            return QueueOutcome::Rejected;
        };

        let queue_key = match QueueKey::new(file_name, target) {
            Ok(key) => key,
            Err(e) => {
                error!(file = %file.display(), %target, error = %e, "Cannot build queue key, work will never be queued");
                return QueueOutcome::Rejected;
            }
        };

        if let Some(outstanding) = self.state.get(target) {
            if outstanding.file_name() == file_name {
                debug!(
                    file = %file.display(),
                    %target,
                    "Not re-queueing work as it has already been queued for replication"
                );
                return QueueOutcome::AlreadyQueued;
            }
            debug!(
                file = %file.display(),
                outstanding = %outstanding,
                peer = target.peer_name(),
                "Not queueing work as the outstanding file must be replicated first"
            );
            return QueueOutcome::Blocked {
                outstanding: outstanding.clone(),
            };
        }

        match self
            .work_queue
            .add_work(queue_key.as_str(), &file.to_string_lossy())
            .await
        {
            Ok(()) => {
                debug!(queue_key = %queue_key, "Queued replication work");
                self.state.insert(queue_key.clone());
                QueueOutcome::Queued(queue_key)
            }
            Err(e) => {
                warn!(
                    file = %file.display(),
                    %target,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Could not queue work"
                );
                QueueOutcome::Failed
            }
        }
    }

    async fn reconcile_pass(&mut self) -> ReconcileStats {
        let start = Instant::now();
        let mut stats = ReconcileStats::default();

        let outstanding: Vec<QueueKey> = self.state.keys().cloned().collect();
        for queue_key in outstanding {
            stats.checked += 1;
            let path = self.work_queue.work_path(queue_key.as_str());

            match self.store.read(&path).await {
                Ok(Some(_)) => {}
                // Absent node: whoever shipped the file removed it
                Ok(None) => {
                    if self.state.remove_key(&queue_key) {
                        debug!(queue_key = %queue_key, "Removing from work assignment state");
                        metrics::record_work_completed(queue_key.target().peer_name(), "reconcile");
                        stats.removed += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        queue_key = %queue_key,
                        error = %e,
                        "Could not check status of queued work, retrying next pass"
                    );
                    stats.errors += 1;
                }
            }
        }

        info!(
            removed = stats.removed,
            checked = stats.checked,
            errors = stats.errors,
            "Removed elements from internal workqueue state because the work was complete"
        );
        metrics::record_reconcile(stats.checked, stats.removed, stats.errors, start.elapsed());
        metrics::set_outstanding_work(self.state.len());
        stats
    }
}

impl<Q: WorkQueue, S: CoordinationStore> WorkAssigner for SequentialWorkAssigner<Q, S> {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize_state(&mut self) -> BoxFuture<'_, Result<()>> {
        let span = self.span.clone();
        Box::pin(self.restore().instrument(span))
    }

    fn should_queue(&self, target: &ReplicationTarget) -> bool {
        self.state.get(target).is_none()
    }

    fn queue_work<'a>(
        &'a mut self,
        file: &'a Path,
        target: &'a ReplicationTarget,
    ) -> BoxFuture<'a, QueueOutcome> {
        let span = self.span.clone();
        Box::pin(self.try_queue(file, target).instrument(span))
    }

    fn queued_for(&self, target: &ReplicationTarget) -> HashSet<QueueKey> {
        self.state.get(target).cloned().into_iter().collect()
    }

    fn remove_completed(
        &mut self,
        target: &ReplicationTarget,
        queue_key: &QueueKey,
    ) -> RemoveOutcome {
        let _enter = self.span.enter();

        let recorded = match self.state.get(target) {
            Some(recorded) => recorded.clone(),
            None => {
                warn!(%target, queue_key = %queue_key, "remove_completed called when no work was queued");
                metrics::record_remove_rejected(target.peer_name(), "not_queued");
                return RemoveOutcome::NotQueued;
            }
        };

        if &recorded != queue_key {
            warn!(
                %target,
                expected = %recorded,
                actual = %queue_key,
                "remove_completed called with differing queue keys"
            );
            metrics::record_remove_rejected(target.peer_name(), "mismatch");
            return RemoveOutcome::Mismatch { recorded };
        }

        self.state.remove(target);
        metrics::record_work_completed(target.peer_name(), "explicit");
        metrics::set_outstanding_work(self.state.len());
        RemoveOutcome::Removed
    }

    fn reconcile(&mut self) -> BoxFuture<'_, ReconcileStats> {
        let span = self.span.clone();
        Box::pin(self.reconcile_pass().instrument(span))
    }

    fn size(&self) -> usize {
        self.state.len()
    }
}
