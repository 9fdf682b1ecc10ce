//! Configuration for the work assigner.
//!
//! Configuration can be constructed programmatically or deserialized from
//! YAML/JSON. Every field has a default, so an empty document is valid.
//!
//! # Quick Start
//!
//! ```rust
//! use replication_assigner::config::AssignerConfig;
//!
//! let mut config = AssignerConfig::for_testing("instance-1");
//! config.driver.max_queue_size = 50;
//! assert!(config.validate().is_ok());
//! ```
//!
//! # Configuration Structure
//!
//! ```text
//! AssignerConfig
//! ├── work_queue: WorkQueueConfig  # Where work nodes live
//! ├── driver: DriverConfig         # Pass cadence and backlog cap
//! └── redis: RedisConfig           # Coordination service connection
//! ```
//!
//! # YAML Example
//!
//! ```yaml
//! work_queue:
//!   root: "/accumulo"
//!   instance_id: "8c1b6f2e-prod"
//!   queue_node: "/replication/workqueue"
//!
//! driver:
//!   assign_interval: "30s"
//!   max_queue_size: 1000
//!
//! redis:
//!   url: "redis://coordination:6379"
//!   operation_timeout: "5s"
//! ```

use crate::error::{ReplicationError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Top-level config
// ═══════════════════════════════════════════════════════════════════════════════

/// The top-level config object for an assignment driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignerConfig {
    /// Location of the work queue in the coordination service.
    #[serde(default)]
    pub work_queue: WorkQueueConfig,

    /// Settings for the periodic assignment pass.
    #[serde(default)]
    pub driver: DriverConfig,

    /// Redis-backed coordination service connection.
    #[serde(default)]
    pub redis: RedisConfig,
}

impl AssignerConfig {
    /// Create a minimal config for testing.
    pub fn for_testing(instance_id: &str) -> Self {
        Self {
            work_queue: WorkQueueConfig {
                instance_id: instance_id.to_string(),
                ..Default::default()
            },
            driver: DriverConfig {
                assign_interval: "100ms".to_string(),
                max_queue_size: 1000,
            },
            redis: RedisConfig::default(),
        }
    }

    /// Check the config for values the assigner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.work_queue.instance_id.is_empty() {
            return Err(ReplicationError::Config(
                "work_queue.instance_id must not be empty".to_string(),
            ));
        }
        if !self.work_queue.root.starts_with('/') {
            return Err(ReplicationError::Config(format!(
                "work_queue.root must be an absolute path, got {:?}",
                self.work_queue.root
            )));
        }
        if !self.work_queue.queue_node.starts_with('/') {
            return Err(ReplicationError::Config(format!(
                "work_queue.queue_node must start with '/', got {:?}",
                self.work_queue.queue_node
            )));
        }
        if self.driver.max_queue_size == 0 {
            return Err(ReplicationError::Config(
                "driver.max_queue_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WorkQueueConfig: node layout in the coordination service
// ═══════════════════════════════════════════════════════════════════════════════

/// Layout of the work queue in the coordination service.
///
/// Work items live at `{root}/{instance_id}{queue_node}/{queue_key}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkQueueConfig {
    /// Root node shared by all instances.
    #[serde(default = "default_root")]
    pub root: String,

    /// Identifier of this storage instance.
    #[serde(default = "default_instance_id")]
    pub instance_id: String,

    /// Queue directory, relative to the instance root.
    #[serde(default = "default_queue_node")]
    pub queue_node: String,
}

fn default_root() -> String {
    "/accumulo".to_string()
}

fn default_instance_id() -> String {
    "local.dev.instance".to_string()
}

fn default_queue_node() -> String {
    "/replication/workqueue".to_string()
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            instance_id: default_instance_id(),
            queue_node: default_queue_node(),
        }
    }
}

impl WorkQueueConfig {
    /// Path of the queue directory node.
    pub fn queue_path(&self) -> String {
        format!(
            "{}/{}{}",
            self.root.trim_end_matches('/'),
            self.instance_id,
            self.queue_node
        )
    }

    /// Path of the node for a single queued work item.
    pub fn work_path(&self, queue_key: &str) -> String {
        format!("{}/{}", self.queue_path(), queue_key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DriverConfig: assignment pass cadence
// ═══════════════════════════════════════════════════════════════════════════════

/// Settings for the periodic assignment pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Time between assignment passes as a duration string (e.g., "30s").
    #[serde(default = "default_assign_interval")]
    pub assign_interval: String,

    /// Stop offering new work once this many targets have work outstanding.
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

fn default_assign_interval() -> String {
    "30s".to_string()
}

fn default_max_queue_size() -> usize {
    1000
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            assign_interval: default_assign_interval(),
            max_queue_size: default_max_queue_size(),
        }
    }
}

impl DriverConfig {
    /// Parse the assign_interval string to a Duration.
    pub fn assign_interval_duration(&self) -> Duration {
        humantime::parse_duration(&self.assign_interval).unwrap_or(Duration::from_secs(30))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RedisConfig: coordination service connection
// ═══════════════════════════════════════════════════════════════════════════════

/// Connection settings for the Redis-backed coordination service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL, e.g. `"redis://coordination:6379"`.
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Upper bound on a single coordination call as a duration string.
    /// Calls that exceed it are reported as interrupted.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_operation_timeout() -> String {
    "5s".to_string()
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            operation_timeout: default_operation_timeout(),
        }
    }
}

impl RedisConfig {
    /// Parse the operation_timeout string to a Duration.
    pub fn operation_timeout_duration(&self) -> Duration {
        humantime::parse_duration(&self.operation_timeout).unwrap_or(Duration::from_secs(5))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
