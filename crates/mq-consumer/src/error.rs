//! Error types for message consumption.

use crate::schema::ValidationFailure;
use mq_client::{QueueError, ValidationError};
use thiserror::Error;

/// Boxed error type carried across the message-handler boundary
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure raised while handling a single message
///
/// These are handled locally by the consumer: each one becomes exactly one
/// record on the error queue, after which the original message is deleted.
/// They never stop the consumer.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("schema validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("message handler failed: {0}")]
    Handler(#[source] BoxError),

    #[error("message handling panicked: {reason}")]
    Panicked { reason: String },
}

impl ProcessingError {
    /// Summarize the error and its cause chain in one line
    ///
    /// Stands in for a stack trace in the published error record.
    pub fn stack_summary(&self) -> String {
        let mut parts = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            parts.push(cause.to_string());
            source = cause.source();
        }
        parts.join(": ")
    }
}

/// Errors that stop a consumer
///
/// Transport failures are never swallowed: a message that can be neither
/// processed, deleted, nor error-reported must surface to the supervisor.
#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("queue transport failure: {0}")]
    Transport(#[from] QueueError),

    #[error("invalid consumer configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("consumer task aborted: {reason}")]
    Aborted { reason: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
