//! Process-local coordination backend.

use super::{AdapterFuture, CoordinationStore, WorkQueue};
use crate::config::WorkQueueConfig;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory work queue and node store.
///
/// Keeps queued work as `queue_key -> payload` and answers reads for the
/// node paths laid out by [`WorkQueueConfig`]. Work is completed by calling
/// [`finish_work`](Self::finish_work), which is what a transport would do
/// after shipping a file.
pub struct InMemoryCoordination {
    layout: WorkQueueConfig,
    queued: RwLock<BTreeMap<String, String>>,
}

impl InMemoryCoordination {
    pub fn new(layout: WorkQueueConfig) -> Self {
        Self {
            layout,
            queued: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn layout(&self) -> &WorkQueueConfig {
        &self.layout
    }

    /// Remove a work item. Returns `false` if it was not queued.
    pub async fn finish_work(&self, queue_key: &str) -> bool {
        let removed = self.queued.write().await.remove(queue_key).is_some();
        tracing::debug!(queue_key, removed, "In-memory work finished");
        removed
    }

    /// Payload stored for a queued key.
    pub async fn payload(&self, queue_key: &str) -> Option<String> {
        self.queued.read().await.get(queue_key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.queued.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queued.read().await.is_empty()
    }
}

impl Default for InMemoryCoordination {
    fn default() -> Self {
        Self::new(WorkQueueConfig::default())
    }
}

impl WorkQueue for InMemoryCoordination {
    fn add_work(&self, queue_key: &str, payload: &str) -> AdapterFuture<'_, ()> {
        let queue_key = queue_key.to_string();
        let payload = payload.to_string();
        Box::pin(async move {
            self.queued
                .write()
                .await
                .entry(queue_key)
                .or_insert(payload);
            Ok(())
        })
    }

    fn list_queued(&self) -> AdapterFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(self.queued.read().await.keys().cloned().collect()) })
    }

    fn work_path(&self, queue_key: &str) -> String {
        self.layout.work_path(queue_key)
    }
}

impl CoordinationStore for InMemoryCoordination {
    fn read(&self, path: &str) -> AdapterFuture<'_, Option<Vec<u8>>> {
        let prefix = format!("{}/", self.layout.queue_path());
        let key = path.strip_prefix(&prefix).map(str::to_string);
        Box::pin(async move {
            let Some(key) = key else {
                return Ok(None);
            };
            Ok(self
                .queued
                .read()
                .await
                .get(&key)
                .map(|payload| payload.as_bytes().to_vec()))
        })
    }
}
