//! # MQ Consumer
//!
//! Message-consumer actor for provider-agnostic queues: polls a source queue,
//! routes each message through an ordered chain of transformation filters,
//! hands accepted messages to application logic, and republishes failures as
//! structured records on a companion error queue.
//!
//! This crate provides:
//! - A single-flight consumer actor (no overlapping callbacks per instance)
//! - Ordered, short-circuiting filter chains
//! - Structured error republication with a stable wire shape
//! - Optional JSON Schema validation of message bodies
//! - Graceful shutdown that finishes the in-flight message
//!
//! ## Architecture
//!
//! The consumer depends only on the [`mq_client::QueueClient`] trait; queue
//! providers are injected at runtime. A message is deleted from its source
//! queue if and only if it was fully processed, or its failure was durably
//! republished to the error queue first. Filter rejection deletes nothing:
//! the message simply reappears once its visibility timeout lapses.
//!
//! ## Module Organization
//!
//! - [config] - Consumer configuration and layered loading
//! - [consumer] - The consumer actor, processor and listener traits
//! - [error] - Consumer and processing error types
//! - [error_report] - Error-queue republication and wire types
//! - [filter] - Message filters and filter chains
//! - [schema] - JSON Schema validation of message bodies

// Module declarations
pub mod config;
pub mod consumer;
pub mod error;
pub mod error_report;
pub mod filter;
pub mod schema;

// Re-export commonly used types at crate root for convenience
pub use config::ConsumerConfig;
pub use consumer::{
    Consumer, ConsumerHandle, ConsumerListener, MessageProcessor, ProcessingOutcome,
};
pub use error::{BoxError, ConsumerError, ProcessingError};
pub use error_report::{ErrorRecord, ErrorReporter};
pub use filter::{FilterChain, MessageFilter};
pub use schema::{SchemaError, SchemaValidator, ValidationFailure};

// Re-export the client surface consumers interact with
pub use mq_client::{Message, QueueClient, QueueName, ReceivedMessage};
