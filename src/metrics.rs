//! Metrics for observability.
//!
//! Exports Prometheus-compatible metrics for:
//! - Queue attempts and their outcome (queued, duplicate, blocked, failed)
//! - Outstanding work (targets with a file in flight)
//! - Reconciliation passes and completions they discover
//! - Coordination service call latency
//! - Driver state
//!
//! # Metric Naming Convention
//!
//! All metrics are prefixed with `replication_assigner_` and follow Prometheus conventions:
//! - Counters end in `_total`
//! - Gauges represent current state
//! - Histograms track distributions (duration, size)
//!
//! # Usage
//!
//! ```rust,no_run
//! use replication_assigner::metrics;
//! use std::time::Duration;
//!
//! metrics::record_queue_attempt("east", "queued");
//! metrics::record_reconcile(12, 3, 0, Duration::from_millis(8));
//! ```

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record one `queue_work` call and how it ended.
pub fn record_queue_attempt(peer: &str, outcome: &str) {
    counter!(
        "replication_assigner_queue_attempts_total",
        "peer" => peer.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Set the number of targets with work outstanding.
pub fn set_outstanding_work(count: usize) {
    gauge!("replication_assigner_outstanding_work").set(count as f64);
}

/// Record entries restored from the coordination service at startup.
pub fn record_state_restored(count: usize) {
    counter!("replication_assigner_restores_total").increment(1);
    gauge!("replication_assigner_restored_entries").set(count as f64);
}

/// Record a completed unit of work leaving the assignment state.
///
/// `via` is `"explicit"` for driver-confirmed completions and
/// `"reconcile"` for completions observed in the coordination service.
pub fn record_work_completed(peer: &str, via: &str) {
    counter!(
        "replication_assigner_work_completed_total",
        "peer" => peer.to_string(),
        "via" => via.to_string()
    )
    .increment(1);
}

/// Record a rejected completion (unknown target or mismatched key).
pub fn record_remove_rejected(peer: &str, reason: &str) {
    counter!(
        "replication_assigner_remove_rejected_total",
        "peer" => peer.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a reconciliation pass.
pub fn record_reconcile(checked: usize, removed: usize, errors: usize, duration: Duration) {
    counter!("replication_assigner_reconciles_total").increment(1);
    counter!("replication_assigner_reconcile_checked_total").increment(checked as u64);
    counter!("replication_assigner_reconcile_removed_total").increment(removed as u64);
    if errors > 0 {
        counter!("replication_assigner_reconcile_errors_total").increment(errors as u64);
    }
    histogram!("replication_assigner_reconcile_duration_seconds").record(duration.as_secs_f64());
}

/// Record a full assignment pass (restore, create work, reconcile).
pub fn record_assignment_pass(queued: usize, duration: Duration) {
    counter!("replication_assigner_passes_total").increment(1);
    counter!("replication_assigner_pass_queued_total").increment(queued as u64);
    histogram!("replication_assigner_pass_duration_seconds").record(duration.as_secs_f64());
}

/// Record a pass that stopped offering work because the backlog is full.
pub fn record_backlog_full(skipped: usize) {
    counter!("replication_assigner_backlog_full_total").increment(1);
    counter!("replication_assigner_backlog_skipped_total").increment(skipped as u64);
}

/// Record a coordination service call.
pub fn record_coordination_op(operation: &str, success: bool, duration: Duration) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "replication_assigner_coordination_ops_total",
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);
    histogram!(
        "replication_assigner_coordination_op_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Set driver state gauge.
pub fn set_driver_state(state: &str) {
    gauge!("replication_assigner_driver_state", "state" => state.to_string()).set(1.0);
}
