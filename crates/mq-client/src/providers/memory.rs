//! In-memory queue provider implementation for testing and development.
//!
//! This module provides a fully functional in-memory queue implementation that:
//! - Implements at-least-once delivery with visibility timeouts
//! - Tracks per-message delivery counts across redeliveries
//! - Tolerates duplicate and stale deletes as no-ops
//! - Provides thread-safe concurrent access
//!
//! This provider is intended for:
//! - Unit testing of queue consumers
//! - Development and prototyping
//! - Reference semantics for real providers

use crate::client::QueueProvider;
use crate::error::QueueError;
use crate::message::{Message, MessageId, QueueName, ReceiptHandle, ReceivedMessage, Timestamp};
use crate::provider::InMemoryConfig;
use async_trait::async_trait;
use chrono::Duration;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use tracing::debug;

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

// ============================================================================
// Internal Storage Structures
// ============================================================================

/// Thread-safe storage for all queues
struct QueueStorage {
    queues: HashMap<QueueName, InMemoryQueue>,
    /// Messages currently within a visibility window, keyed by receipt handle
    in_flight: HashMap<String, InFlightMessage>,
    config: InMemoryConfig,
}

impl QueueStorage {
    fn new(config: InMemoryConfig) -> Self {
        Self {
            queues: HashMap::new(),
            in_flight: HashMap::new(),
            config,
        }
    }

    fn queue_mut(&mut self, queue_name: &QueueName) -> Result<&mut InMemoryQueue, QueueError> {
        self.queues
            .get_mut(queue_name)
            .ok_or_else(|| QueueError::QueueNotFound {
                queue_name: queue_name.as_str().to_string(),
            })
    }

    /// Return expired in-flight messages of one queue to its visible tail
    ///
    /// Redelivery order relative to newer messages is unspecified, matching
    /// the external queue contract (ordering not guaranteed across producers).
    fn requeue_expired(&mut self, queue_name: &QueueName) {
        let expired: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, entry)| entry.queue_name == *queue_name && entry.is_expired())
            .map(|(handle, _)| handle.clone())
            .collect();

        for handle in expired {
            if let Some(entry) = self.in_flight.remove(&handle) {
                debug!(
                    queue = %queue_name,
                    message_id = %entry.message.message_id,
                    delivery_count = entry.message.delivery_count,
                    enqueued_at = %entry.message.enqueued_at,
                    "Visibility timeout expired; message returned to queue"
                );
                if let Some(queue) = self.queues.get_mut(queue_name) {
                    queue.messages.push_back(entry.message);
                }
            }
        }
    }
}

/// Internal queue state for a single queue
struct InMemoryQueue {
    /// Visible messages in arrival order
    messages: VecDeque<StoredMessage>,
}

impl InMemoryQueue {
    fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }
}

/// A message stored in the queue with metadata
#[derive(Clone)]
struct StoredMessage {
    message_id: MessageId,
    body: String,
    attributes: HashMap<String, String>,
    enqueued_at: Timestamp,
    delivery_count: u32,
}

impl StoredMessage {
    fn from_message(message: &Message, message_id: MessageId) -> Self {
        Self {
            message_id,
            body: message.body.clone(),
            attributes: message.attributes.clone(),
            enqueued_at: Timestamp::now(),
            delivery_count: 0,
        }
    }
}

/// A message currently being processed
struct InFlightMessage {
    message: StoredMessage,
    queue_name: QueueName,
    lock_expires_at: Timestamp,
}

impl InFlightMessage {
    fn is_expired(&self) -> bool {
        Timestamp::now() >= self.lock_expires_at
    }
}

// ============================================================================
// InMemoryProvider
// ============================================================================

/// In-memory queue provider implementation
pub struct InMemoryProvider {
    storage: RwLock<QueueStorage>,
}

impl InMemoryProvider {
    /// Create new in-memory provider with configuration
    pub fn new(config: InMemoryConfig) -> Self {
        Self {
            storage: RwLock::new(QueueStorage::new(config)),
        }
    }

    fn lock_poisoned() -> QueueError {
        QueueError::ProviderError {
            provider: "in-memory".to_string(),
            code: "lock-poisoned".to_string(),
            message: "queue storage lock poisoned by a panicked holder".to_string(),
        }
    }

    /// Move up to `max_messages` visible messages into the in-flight table
    fn take_messages(
        storage: &mut QueueStorage,
        queue_name: &QueueName,
        max_messages: u32,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        // Fail on unknown queues before sweeping anything
        storage.queue_mut(queue_name)?;
        storage.requeue_expired(queue_name);

        let visibility_timeout = storage.config.visibility_timeout;

        let mut received = Vec::new();
        for _ in 0..max_messages {
            let Some(mut stored) = storage.queue_mut(queue_name)?.messages.pop_front() else {
                break;
            };

            stored.delivery_count += 1;
            let now = Timestamp::now();
            let expires_at = Timestamp::from_datetime(now.as_datetime() + visibility_timeout);
            let handle = uuid::Uuid::new_v4().to_string();

            received.push(ReceivedMessage {
                message_id: stored.message_id.clone(),
                body: stored.body.clone(),
                attributes: stored.attributes.clone(),
                receipt_handle: ReceiptHandle::new(handle.clone(), expires_at.clone()),
                delivery_count: stored.delivery_count,
                delivered_at: now,
            });

            storage.in_flight.insert(
                handle,
                InFlightMessage {
                    message: stored,
                    queue_name: queue_name.clone(),
                    lock_expires_at: expires_at,
                },
            );
        }

        Ok(received)
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new(InMemoryConfig::default())
    }
}

#[async_trait]
impl QueueProvider for InMemoryProvider {
    async fn create_queue(&self, queue: &QueueName) -> Result<(), QueueError> {
        let mut storage = self.storage.write().map_err(|_| Self::lock_poisoned())?;
        storage
            .queues
            .entry(queue.clone())
            .or_insert_with(InMemoryQueue::new);
        Ok(())
    }

    async fn send_message(
        &self,
        queue: &QueueName,
        message: &Message,
    ) -> Result<MessageId, QueueError> {
        let mut storage = self.storage.write().map_err(|_| Self::lock_poisoned())?;

        let capacity = storage.config.max_queue_size;
        let target = storage.queue_mut(queue)?;
        if target.messages.len() >= capacity {
            return Err(QueueError::QueueFull {
                queue_name: queue.as_str().to_string(),
                capacity,
            });
        }

        let message_id = MessageId::new();
        target
            .messages
            .push_back(StoredMessage::from_message(message, message_id.clone()));

        debug!(queue = %queue, message_id = %message_id, "Message enqueued");
        Ok(message_id)
    }

    async fn receive_message(
        &self,
        queue: &QueueName,
        timeout: Duration,
    ) -> Result<Option<ReceivedMessage>, QueueError> {
        let mut messages = self.receive_messages(queue, 1, timeout).await?;
        Ok(messages.pop())
    }

    async fn receive_messages(
        &self,
        queue: &QueueName,
        max_messages: u32,
        _timeout: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        // Short polling: an empty queue yields an empty result immediately.
        // The timeout is honored as an upper bound, which zero satisfies.
        let mut storage = self.storage.write().map_err(|_| Self::lock_poisoned())?;
        Self::take_messages(&mut storage, queue, max_messages)
    }

    async fn delete_message(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let mut storage = self.storage.write().map_err(|_| Self::lock_poisoned())?;

        match storage.in_flight.remove(receipt.handle()) {
            Some(entry) => {
                debug!(
                    queue = %entry.queue_name,
                    message_id = %entry.message.message_id,
                    "Message deleted"
                );
            }
            None => {
                // Unknown or stale handle: duplicate deletes are tolerated
                debug!(receipt = receipt.handle(), "Delete of unknown receipt ignored");
            }
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "in-memory"
    }
}
