//! Consumer configuration.
//!
//! All tuning fields carry serde defaults, so a config file only needs the
//! queue names. Layered loading follows the usual order: deployment-local
//! file, operator-specified file, then environment overrides.

use mq_client::{QueueName, ValidationError};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Configuration for one consumer instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Queue the consumer polls
    pub source_queue: QueueName,

    /// Queue receiving error records; defaults to `<source_queue>-errors`
    #[serde(default)]
    pub error_queue: Option<QueueName>,

    /// Upper bound on messages fetched per poll
    #[serde(default = "default_max_messages_per_poll")]
    pub max_messages_per_poll: u32,

    /// Upper bound on how long one receive call may wait
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Pause between polls when the queue is empty
    #[serde(default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,
}

fn default_max_messages_per_poll() -> u32 {
    10
}

fn default_poll_timeout_secs() -> u64 {
    5
}

fn default_idle_backoff_ms() -> u64 {
    250
}

impl ConsumerConfig {
    /// Create configuration for a source queue with default tuning
    pub fn new(source_queue: QueueName) -> Self {
        Self {
            source_queue,
            error_queue: None,
            max_messages_per_poll: default_max_messages_per_poll(),
            poll_timeout_secs: default_poll_timeout_secs(),
            idle_backoff_ms: default_idle_backoff_ms(),
        }
    }

    /// Set an explicit error queue
    pub fn with_error_queue(mut self, error_queue: QueueName) -> Self {
        self.error_queue = Some(error_queue);
        self
    }

    /// Resolve the error queue, deriving `<source_queue>-errors` when unset
    ///
    /// Derivation can fail when the composed name exceeds the length limit.
    pub fn resolved_error_queue(&self) -> Result<QueueName, ValidationError> {
        match &self.error_queue {
            Some(queue) => Ok(queue.clone()),
            None => QueueName::with_suffix(self.source_queue.as_str(), "errors"),
        }
    }

    /// Receive timeout as a duration
    pub fn poll_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.poll_timeout_secs as i64)
    }

    /// Idle backoff as a duration
    pub fn idle_backoff(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.idle_backoff_ms)
    }

    /// Load configuration from files and environment
    ///
    /// Sources (applied in order — later sources override earlier ones):
    ///  1. ./config/consumer.yaml                 — deployment-local file
    ///  2. Path given by MQ_CONSUMER_CONFIG_FILE  — operator-specified file
    ///  3. Environment variables prefixed MQ_CONSUMER__ (double-underscore
    ///     separator), e.g. MQ_CONSUMER__SOURCE_QUEUE=orders
    ///
    /// A malformed file or an environment variable that cannot be coerced to
    /// the right type is a hard error: it indicates deliberate-but-broken
    /// operator configuration.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(
            config::File::with_name("config/consumer")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

        // Optional explicit path supplied by the operator.
        if let Ok(explicit_path) = std::env::var("MQ_CONSUMER_CONFIG_FILE") {
            if !explicit_path.is_empty() {
                builder = builder.add_source(
                    config::File::with_name(&explicit_path)
                        .required(true)
                        .format(config::FileFormat::Yaml),
                );
            }
        }

        builder
            .add_source(config::Environment::with_prefix("MQ_CONSUMER").separator("__"))
            .build()?
            .try_deserialize()
    }
}
