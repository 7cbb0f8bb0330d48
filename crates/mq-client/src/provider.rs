//! Provider configuration types.

use chrono::Duration;

/// Configuration for queue client initialization
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Upper bound on messages returned from a single receive call
    pub max_receive_batch: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_receive_batch: 10,
        }
    }
}

/// In-memory provider configuration
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Maximum number of visible messages a single queue holds
    pub max_queue_size: usize,
    /// Window during which a received-but-undeleted message stays invisible
    pub visibility_timeout: Duration,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 10000,
            visibility_timeout: Duration::seconds(30),
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
