//! Mock coordination service for testing.
//!
//! Implements both [`WorkQueue`] and [`CoordinationStore`], records every
//! call for assertions, and can be told to fail specific operations.

use replication_assigner::coordination::{AdapterFuture, CoordinationStore, WorkQueue};
use replication_assigner::config::WorkQueueConfig;
use replication_assigner::ReplicationError;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A recorded add_work() call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddWorkCall {
    pub queue_key: String,
    pub payload: String,
}

/// Mock coordination service that records all calls.
///
/// # Example
/// ```rust,ignore
/// let mock = Arc::new(MockCoordination::new());
/// mock.seed("wal-1|east|T1", "/wal/wal-1").await;
/// mock.fail_read_for("wal-1|east|T1").await;
///
/// // Use in tests...
///
/// assert_eq!(mock.add_calls().await.len(), 0);
/// ```
pub struct MockCoordination {
    layout: WorkQueueConfig,
    /// Work items currently queued: queue key -> payload
    nodes: RwLock<BTreeMap<String, String>>,
    /// Recorded add_work() calls, including failed ones
    add_calls: RwLock<Vec<AddWorkCall>>,
    /// Recorded read() paths
    read_calls: RwLock<Vec<String>>,
    /// Number of list_queued() calls
    list_calls: AtomicUsize,
    /// Reject add_work() calls
    fail_adds: AtomicBool,
    /// Reject list_queued() calls
    fail_list: AtomicBool,
    /// Queue keys whose read() fails
    failing_reads: RwLock<HashSet<String>>,
}

impl MockCoordination {
    pub fn new() -> Self {
        Self::with_layout(WorkQueueConfig {
            instance_id: "test-instance".to_string(),
            ..Default::default()
        })
    }

    pub fn with_layout(layout: WorkQueueConfig) -> Self {
        Self {
            layout,
            nodes: RwLock::new(BTreeMap::new()),
            add_calls: RwLock::new(Vec::new()),
            read_calls: RwLock::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            fail_adds: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            failing_reads: RwLock::new(HashSet::new()),
        }
    }

    pub fn layout(&self) -> &WorkQueueConfig {
        &self.layout
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Put a work item in the queue without recording a call.
    pub async fn seed(&self, queue_key: &str, payload: &str) {
        self.nodes
            .write()
            .await
            .insert(queue_key.to_string(), payload.to_string());
    }

    /// Remove a work item, as a transport does after shipping the file.
    pub async fn complete(&self, queue_key: &str) -> bool {
        self.nodes.write().await.remove(queue_key).is_some()
    }

    pub fn fail_adds(&self, fail: bool) {
        self.fail_adds.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make read() fail for the node of `queue_key`.
    pub async fn fail_read_for(&self, queue_key: &str) {
        self.failing_reads
            .write()
            .await
            .insert(queue_key.to_string());
    }

    pub async fn clear_read_failures(&self) {
        self.failing_reads.write().await.clear();
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    pub async fn add_calls(&self) -> Vec<AddWorkCall> {
        self.add_calls.read().await.clone()
    }

    pub async fn read_calls(&self) -> Vec<String> {
        self.read_calls.read().await.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub async fn queued_keys(&self) -> Vec<String> {
        self.nodes.read().await.keys().cloned().collect()
    }

    pub async fn payload(&self, queue_key: &str) -> Option<String> {
        self.nodes.read().await.get(queue_key).cloned()
    }
}

impl Default for MockCoordination {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue for MockCoordination {
    fn add_work(&self, queue_key: &str, payload: &str) -> AdapterFuture<'_, ()> {
        let call = AddWorkCall {
            queue_key: queue_key.to_string(),
            payload: payload.to_string(),
        };
        Box::pin(async move {
            self.add_calls.write().await.push(call.clone());
            if self.fail_adds.load(Ordering::SeqCst) {
                return Err(ReplicationError::coordination_msg(
                    "add_work",
                    "mock coordination failure",
                ));
            }
            self.nodes
                .write()
                .await
                .entry(call.queue_key)
                .or_insert(call.payload);
            Ok(())
        })
    }

    fn list_queued(&self) -> AdapterFuture<'_, Vec<String>> {
        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(ReplicationError::coordination_msg(
                    "list_queued",
                    "mock connection loss",
                ));
            }
            Ok(self.nodes.read().await.keys().cloned().collect())
        })
    }

    fn work_path(&self, queue_key: &str) -> String {
        self.layout.work_path(queue_key)
    }
}

impl CoordinationStore for MockCoordination {
    fn read(&self, path: &str) -> AdapterFuture<'_, Option<Vec<u8>>> {
        let path = path.to_string();
        Box::pin(async move {
            self.read_calls.write().await.push(path.clone());

            let prefix = format!("{}/", self.layout.queue_path());
            let Some(queue_key) = path.strip_prefix(&prefix) else {
                return Ok(None);
            };
            if self.failing_reads.read().await.contains(queue_key) {
                return Err(ReplicationError::interrupted("read"));
            }
            Ok(self
                .nodes
                .read()
                .await
                .get(queue_key)
                .map(|payload| payload.as_bytes().to_vec()))
        })
    }
}
