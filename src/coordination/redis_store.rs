// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis-backed coordination service.
//!
//! # Layout
//!
//! ```text
//! {queue_path}              SET     of queued keys  (the queue directory)
//! {queue_path}/{queue_key}  STRING  payload          (one node per work item)
//! ```
//!
//! Enqueue writes both in one MULTI block, so a key is never listed without
//! its node. Whoever ships the file removes both when it is done; the
//! assigner only observes the node disappearing.
//!
//! # Timeouts
//!
//! Every command is bounded by `operation_timeout`. A command that does not
//! finish in time is reported as [`Interrupted`](ReplicationError::Interrupted).

use super::{AdapterFuture, CoordinationStore, WorkQueue};
use crate::config::{RedisConfig, WorkQueueConfig};
use crate::error::{ReplicationError, Result};
use crate::metrics;
use crate::resilience::RetryConfig;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Coordination service adapter over a Redis connection.
pub struct RedisCoordination {
    conn: ConnectionManager,
    layout: WorkQueueConfig,
    operation_timeout: Duration,
}

impl RedisCoordination {
    /// Connect to Redis with retry logic.
    pub async fn connect(
        config: &RedisConfig,
        layout: WorkQueueConfig,
        retry_config: &RetryConfig,
    ) -> Result<Self> {
        info!(
            url = %config.url,
            queue_path = %layout.queue_path(),
            "Connecting to coordination service"
        );

        let client = Client::open(config.url.as_str())
            .map_err(|e| ReplicationError::Config(format!("Invalid Redis URL: {}", e)))?;

        let mut attempt = 0;

        loop {
            attempt += 1;

            // Bound each attempt so an unreachable host cannot hang startup
            let failure = match timeout(
                retry_config.connection_timeout,
                client.get_connection_manager(),
            )
            .await
            {
                Ok(Ok(conn)) => {
                    if attempt > 1 {
                        info!(attempt, "Connected to coordination service after retry");
                    } else {
                        info!("Connected to coordination service");
                    }
                    return Ok(Self::with_connection(
                        conn,
                        layout,
                        config.operation_timeout_duration(),
                    ));
                }
                Ok(Err(e)) => ReplicationError::coordination("connect", e),
                Err(_) => ReplicationError::interrupted("connect"),
            };

            if attempt >= retry_config.max_attempts {
                error!(attempt, error = %failure, "Failed to connect after max retries");
                return Err(failure);
            }

            let delay = retry_config.delay_for_attempt(attempt);
            warn!(
                attempt,
                delay_ms = delay.as_millis(),
                error = %failure,
                "Connection attempt failed, retrying"
            );

            tokio::time::sleep(delay).await;
        }
    }

    /// Wrap an established connection.
    pub fn with_connection(
        conn: ConnectionManager,
        layout: WorkQueueConfig,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            conn,
            layout,
            operation_timeout,
        }
    }

    pub fn layout(&self) -> &WorkQueueConfig {
        &self.layout
    }

    /// Remove a work item and its directory entry.
    ///
    /// Returns `false` if the node did not exist.
    pub async fn finish_work(&self, queue_key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(self.layout.work_path(queue_key))
            .srem(self.layout.queue_path(), queue_key);

        let (deleted, _unlisted): (u32, u32) = self
            .run("finish_work", pipe.query_async(&mut conn))
            .await?;
        debug!(queue_key, deleted, "Work node removed");
        Ok(deleted > 0)
    }

    async fn run<T, F>(&self, operation: &'static str, command: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        let start = Instant::now();
        let result = match timeout(self.operation_timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ReplicationError::coordination(operation, e)),
            Err(_) => Err(ReplicationError::interrupted(operation)),
        };
        metrics::record_coordination_op(operation, result.is_ok(), start.elapsed());
        result
    }
}

impl WorkQueue for RedisCoordination {
    fn add_work(&self, queue_key: &str, payload: &str) -> AdapterFuture<'_, ()> {
        let queue_key = queue_key.to_string();
        let payload = payload.to_string();
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let mut pipe = redis::pipe();
            pipe.atomic()
                .set_nx(self.layout.work_path(&queue_key), payload)
                .ignore()
                .sadd(self.layout.queue_path(), &queue_key)
                .ignore();

            self.run::<(), _>("add_work", pipe.query_async(&mut conn)).await
        })
    }

    fn list_queued(&self) -> AdapterFuture<'_, Vec<String>> {
        Box::pin(async move {
            let mut conn = self.conn.clone();
            let queue_path = self.layout.queue_path();
            let mut keys: Vec<String> = self
                .run("list_queued", conn.smembers(&queue_path))
                .await?;
            keys.sort();
            Ok(keys)
        })
    }

    fn work_path(&self, queue_key: &str) -> String {
        self.layout.work_path(queue_key)
    }
}

impl CoordinationStore for RedisCoordination {
    fn read(&self, path: &str) -> AdapterFuture<'_, Option<Vec<u8>>> {
        let path = path.to_string();
        Box::pin(async move {
            let mut conn = self.conn.clone();
            self.run("read", conn.get::<_, Option<Vec<u8>>>(&path)).await
        })
    }
}
