//! # MQ Client
//!
//! Provider-agnostic queue client for reliable message consumption with an
//! in-memory implementation for testing and development.
//!
//! This library provides:
//! - Provider-agnostic queue operations (send, receive, delete)
//! - At-least-once delivery with visibility timeouts
//! - Receipt-handle based acknowledgement
//! - A complete in-memory provider for tests and prototyping
//!
//! ## Module Organization
//!
//! - [error] - Error types for all queue operations
//! - [message] - Message structures and receipt handles
//! - [provider] - Provider configuration
//! - [client] - Client traits and implementations

// Module declarations
pub mod client;
pub mod error;
pub mod message;
pub mod provider;
pub mod providers;

// Re-export commonly used types at crate root for convenience
pub use client::{QueueClient, QueueClientFactory, QueueProvider, StandardQueueClient};
pub use error::{QueueError, SerializationError, ValidationError};
pub use message::{Message, MessageId, QueueName, ReceiptHandle, ReceivedMessage, Timestamp};
pub use provider::{InMemoryConfig, QueueConfig};
pub use providers::InMemoryProvider;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
