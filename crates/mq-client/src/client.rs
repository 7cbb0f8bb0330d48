//! Client traits and implementations for queue operations.

use crate::error::QueueError;
use crate::message::{Message, MessageId, QueueName, ReceiptHandle, ReceivedMessage};
use crate::provider::{InMemoryConfig, QueueConfig};
use crate::providers::InMemoryProvider;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::warn;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Main interface for queue operations across all providers
///
/// Queues are created externally before use; consumers only send, receive,
/// and delete. Delivery is at-least-once: a received message that is not
/// deleted before its visibility timeout becomes eligible for redelivery.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Create queue if it does not exist (idempotent)
    async fn create_queue(&self, queue: &QueueName) -> Result<(), QueueError>;

    /// Send single message to queue
    async fn send_message(
        &self,
        queue: &QueueName,
        message: Message,
    ) -> Result<MessageId, QueueError>;

    /// Receive single message from queue
    ///
    /// Returns promptly with `None` when the queue is empty; `timeout` is an
    /// upper bound on the wait, never a guarantee of one.
    async fn receive_message(
        &self,
        queue: &QueueName,
        timeout: Duration,
    ) -> Result<Option<ReceivedMessage>, QueueError>;

    /// Receive multiple messages from queue
    async fn receive_messages(
        &self,
        queue: &QueueName,
        max_messages: u32,
        timeout: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError>;

    /// Remove a message from its queue using a still-valid receipt handle
    ///
    /// Deleting with an unknown or stale handle is a no-op.
    async fn delete_message(&self, receipt: ReceiptHandle) -> Result<(), QueueError>;
}

/// Interface implemented by specific queue providers
#[async_trait]
pub trait QueueProvider: Send + Sync {
    /// Create queue if it does not exist
    async fn create_queue(&self, queue: &QueueName) -> Result<(), QueueError>;

    /// Send single message
    async fn send_message(
        &self,
        queue: &QueueName,
        message: &Message,
    ) -> Result<MessageId, QueueError>;

    /// Receive single message
    async fn receive_message(
        &self,
        queue: &QueueName,
        timeout: Duration,
    ) -> Result<Option<ReceivedMessage>, QueueError>;

    /// Receive multiple messages
    async fn receive_messages(
        &self,
        queue: &QueueName,
        max_messages: u32,
        timeout: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError>;

    /// Delete message using receipt handle
    async fn delete_message(&self, receipt: &ReceiptHandle) -> Result<(), QueueError>;

    /// Get provider name for diagnostics
    fn provider_name(&self) -> &'static str;
}

/// Factory for creating queue clients with appropriate providers
pub struct QueueClientFactory;

impl QueueClientFactory {
    /// Create queue client backed by the in-memory provider
    ///
    /// Returns a shared handle: consumers and error reporters hold clones of
    /// the same client.
    pub fn create_in_memory(config: InMemoryConfig) -> Arc<dyn QueueClient> {
        let provider = InMemoryProvider::new(config);
        Arc::new(StandardQueueClient::new(
            Box::new(provider),
            QueueConfig::default(),
        ))
    }

    /// Create test client with in-memory provider and default configuration
    pub fn create_test_client() -> Arc<dyn QueueClient> {
        Self::create_in_memory(InMemoryConfig::default())
    }
}

/// Standard queue client implementation
pub struct StandardQueueClient {
    provider: Box<dyn QueueProvider>,
    config: QueueConfig,
}

impl StandardQueueClient {
    /// Create new standard queue client with provider
    pub fn new(provider: Box<dyn QueueProvider>, config: QueueConfig) -> Self {
        Self { provider, config }
    }

    /// Clamp a requested batch size to the configured maximum
    fn clamp_batch(&self, max_messages: u32) -> u32 {
        if max_messages > self.config.max_receive_batch {
            warn!(
                provider = self.provider.provider_name(),
                requested = max_messages,
                clamped_to = self.config.max_receive_batch,
                "Receive batch size exceeds configured maximum"
            );
            self.config.max_receive_batch
        } else {
            max_messages
        }
    }
}

#[async_trait]
impl QueueClient for StandardQueueClient {
    async fn create_queue(&self, queue: &QueueName) -> Result<(), QueueError> {
        self.provider.create_queue(queue).await
    }

    async fn send_message(
        &self,
        queue: &QueueName,
        message: Message,
    ) -> Result<MessageId, QueueError> {
        self.provider.send_message(queue, &message).await
    }

    async fn receive_message(
        &self,
        queue: &QueueName,
        timeout: Duration,
    ) -> Result<Option<ReceivedMessage>, QueueError> {
        self.provider.receive_message(queue, timeout).await
    }

    async fn receive_messages(
        &self,
        queue: &QueueName,
        max_messages: u32,
        timeout: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        let max_messages = self.clamp_batch(max_messages);
        self.provider
            .receive_messages(queue, max_messages, timeout)
            .await
    }

    async fn delete_message(&self, receipt: ReceiptHandle) -> Result<(), QueueError> {
        self.provider.delete_message(&receipt).await
    }
}
