// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Testcontainers setup for Redis.
//!
//! Provides helpers to spin up Redis containers for integration tests.

use redis::AsyncCommands;
use replication_assigner::config::WorkQueueConfig;
use testcontainers::{clients::Cli, core::WaitFor, Container, GenericImage};

/// Create a vanilla Redis container.
///
/// Uses official redis:7 image. Waits for "Ready to accept connections".
pub fn redis_container(docker: &Cli) -> Container<'_, GenericImage> {
    let image = GenericImage::new("redis", "7-alpine")
        .with_exposed_port(6379)
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));
    docker.run(image)
}

/// Get the Redis URL for a container.
pub fn redis_url(container: &Container<'_, GenericImage>) -> String {
    let port = container.get_host_port_ipv4(6379);
    format!("redis://127.0.0.1:{}", port)
}

/// A Redis-backed coordination service for one storage instance.
pub struct TestCoordinationService<'a> {
    #[allow(dead_code)] // Kept alive for container lifetime
    container: Container<'a, GenericImage>,
    pub redis_url: String,
    pub layout: WorkQueueConfig,
}

impl<'a> TestCoordinationService<'a> {
    pub fn new(docker: &'a Cli, instance_id: &str) -> Self {
        let container = redis_container(docker);
        let redis_url = redis_url(&container);
        Self {
            container,
            redis_url,
            layout: WorkQueueConfig {
                instance_id: instance_id.to_string(),
                ..Default::default()
            },
        }
    }

    async fn connection(&self) -> redis::RedisResult<redis::aio::MultiplexedConnection> {
        let client = redis::Client::open(self.redis_url.as_str())?;
        client.get_multiplexed_async_connection().await
    }

    /// Queue a work item the way another process would have.
    pub async fn seed_work(&self, queue_key: &str, payload: &str) -> redis::RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(self.layout.work_path(queue_key), payload)
            .await?;
        conn.sadd(self.layout.queue_path(), queue_key).await
    }

    /// Remove only the work node, leaving the directory entry behind.
    pub async fn delete_node(&self, queue_key: &str) -> redis::RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.del(self.layout.work_path(queue_key)).await
    }

    pub async fn node_payload(&self, queue_key: &str) -> redis::RedisResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(self.layout.work_path(queue_key)).await
    }

    pub async fn queued_keys(&self) -> redis::RedisResult<Vec<String>> {
        let mut conn = self.connection().await?;
        let mut keys: Vec<String> = conn.smembers(self.layout.queue_path()).await?;
        keys.sort();
        Ok(keys)
    }
}
