// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the work assigner.
//!
//! Errors are categorized by how the scheduler recovers from them.
//!
//! # Error Categories
//!
//! | Error Type | Retryable | Description |
//! |------------|-----------|-------------|
//! | `Coordination` | Yes | Coordination service unreachable, command failed |
//! | `Interrupted` | Yes | Adapter call interrupted or timed out |
//! | `StartupReconciliation` | No | Queued work could not be restored at startup |
//! | `InvalidQueueKey` | No | Queue key could not be encoded or decoded |
//! | `Config` | No | Configuration invalid |
//! | `InvalidState` | No | Driver lifecycle violation |
//!
//! # Retry Behavior
//!
//! Retryable errors are transient adapter failures. The assigner never retries
//! them itself: the affected operation is skipped and the next driver pass
//! tries again. `StartupReconciliation` is fatal, the driver must not run with
//! an unknown assignment state.

use thiserror::Error;

/// Result type alias for assigner operations.
pub type Result<T> = std::result::Result<T, ReplicationError>;

/// Errors that can occur while assigning replication work.
#[derive(Error, Debug)]
pub enum ReplicationError {
    /// Coordination service error.
    ///
    /// Occurs when creating, listing or reading work nodes fails.
    /// Retryable on a later pass.
    #[error("Coordination error ({operation}): {message}")]
    Coordination {
        operation: String,
        message: String,
        #[source]
        source: Option<redis::RedisError>,
    },

    /// An adapter call was interrupted before it completed.
    ///
    /// Timeouts enforced by an adapter surface as interruptions.
    #[error("Interrupted during {operation}")]
    Interrupted { operation: String },

    /// Existing queued work could not be read back at startup.
    ///
    /// Fatal: the assigner cannot establish a safe state.
    #[error("Error reading existing queued replication work: {source}")]
    StartupReconciliation {
        #[source]
        source: Box<ReplicationError>,
    },

    /// A queue key could not be built or parsed.
    #[error("Invalid queue key {key:?}: {reason}")]
    InvalidQueueKey { key: String, reason: String },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver state machine violation.
    ///
    /// Occurs when an operation is attempted in the wrong state
    /// (e.g., running a driver that already failed).
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },
}

impl ReplicationError {
    /// Create a coordination error from a redis::RedisError
    pub fn coordination(operation: impl Into<String>, source: redis::RedisError) -> Self {
        Self::Coordination {
            operation: operation.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a coordination error without source
    pub fn coordination_msg(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Coordination {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an interruption error
    pub fn interrupted(operation: impl Into<String>) -> Self {
        Self::Interrupted {
            operation: operation.into(),
        }
    }

    /// Wrap an error raised while restoring state at startup
    pub fn startup(source: ReplicationError) -> Self {
        Self::StartupReconciliation {
            source: Box::new(source),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Coordination { .. } => true,
            Self::Interrupted { .. } => true,
            Self::StartupReconciliation { .. } => false,
            Self::InvalidQueueKey { .. } => false,
            Self::Config(_) => false,
            Self::InvalidState { .. } => false,
        }
    }
}

impl From<redis::RedisError> for ReplicationError {
    fn from(e: redis::RedisError) -> Self {
        Self::coordination("unknown", e)
    }
}
