//! Read-through cache over a [`CoordinationStore`].
//!
//! Reconciliation probes every outstanding work node on each tick. With many
//! peers and tables that is a lot of reads for nodes that mostly still exist,
//! so "present" answers are cached for a short TTL. "Absent" answers are never
//! cached: absence is the completion signal and must be seen as soon as the
//! next read after the TTL.

use super::{AdapterFuture, CoordinationStore};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default TTL for cached node reads (5 seconds).
pub const DEFAULT_NODE_CACHE_TTL: Duration = Duration::from_secs(5);

struct CachedNode {
    data: Vec<u8>,
    expires_at: Instant,
}

/// Caches positive reads of an inner store for `ttl`.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    nodes: RwLock<HashMap<String, CachedNode>>,
}

impl<S: CoordinationStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_NODE_CACHE_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            nodes: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the cached entry for `path`.
    pub async fn invalidate(&self, path: &str) {
        self.nodes.write().await.remove(path);
    }

    pub async fn cached_len(&self) -> usize {
        self.nodes.read().await.len()
    }
}

impl<S: CoordinationStore> CoordinationStore for CachedStore<S> {
    fn read(&self, path: &str) -> AdapterFuture<'_, Option<Vec<u8>>> {
        let path = path.to_string();
        Box::pin(async move {
            if let Some(node) = self.nodes.read().await.get(&path) {
                if node.expires_at > Instant::now() {
                    return Ok(Some(node.data.clone()));
                }
            }

            let value = self.inner.read(&path).await?;

            let mut nodes = self.nodes.write().await;
            match &value {
                Some(data) => {
                    nodes.insert(
                        path,
                        CachedNode {
                            data: data.clone(),
                            expires_at: Instant::now() + self.ttl,
                        },
                    );
                }
                None => {
                    nodes.remove(&path);
                }
            }
            Ok(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{InMemoryCoordination, WorkQueue};

    #[tokio::test(start_paused = true)]
    async fn test_present_read_is_cached_until_ttl() {
        let cache = CachedStore::with_ttl(InMemoryCoordination::default(), Duration::from_secs(5));
        cache.inner().add_work("a|east|T1", "/wal/a").await.unwrap();
        let path = cache.inner().layout().work_path("a|east|T1");

        assert!(cache.read(&path).await.unwrap().is_some());
        assert_eq!(cache.cached_len().await, 1);

        // Completed underneath, but the cached answer still stands
        cache.inner().finish_work("a|east|T1").await;
        assert!(cache.read(&path).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cache.read(&path).await.unwrap().is_none());
        assert_eq!(cache.cached_len().await, 0);
    }

    #[tokio::test]
    async fn test_absent_read_is_not_cached() {
        let cache = CachedStore::new(InMemoryCoordination::default());
        let path = cache.inner().layout().work_path("a|east|T1");

        assert!(cache.read(&path).await.unwrap().is_none());
        assert_eq!(cache.cached_len().await, 0);

        cache.inner().add_work("a|east|T1", "/wal/a").await.unwrap();
        assert!(cache.read(&path).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_forces_reread() {
        let cache = CachedStore::new(InMemoryCoordination::default());
        cache.inner().add_work("a|east|T1", "/wal/a").await.unwrap();
        let path = cache.inner().layout().work_path("a|east|T1");

        assert!(cache.read(&path).await.unwrap().is_some());
        cache.inner().finish_work("a|east|T1").await;
        cache.invalidate(&path).await;

        assert!(cache.read(&path).await.unwrap().is_none());
    }
}
