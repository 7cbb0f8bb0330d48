//! Error-queue republication.
//!
//! Converts a processing failure plus the original message into a structured
//! record and publishes it to the configured error queue. The record's wire
//! shape is stable: downstream error consumers depend on the exact field
//! names and nesting.

use crate::error::ProcessingError;
use mq_client::{Message, MessageId, QueueClient, QueueError, QueueName, ReceivedMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

#[cfg(test)]
#[path = "error_report_tests.rs"]
mod tests;

// ============================================================================
// Wire Types
// ============================================================================

/// Structured record published to the error queue
///
/// Serialized shape:
/// `{"error-message": {"json": ..., "error": ..., "errorStackTrace": {"errorMessage": ...}}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(rename = "error-message")]
    pub error_message: ErrorMessageBody,
}

/// Inner payload of an [`ErrorRecord`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessageBody {
    /// Original message content, parsed as JSON when possible, raw otherwise
    pub json: Value,
    /// Human-readable error description
    pub error: String,
    #[serde(rename = "errorStackTrace")]
    pub error_stack_trace: ErrorStackTrace,
}

/// Condensed stand-in for a stack trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorStackTrace {
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

impl ErrorRecord {
    /// Build a record from a failure and the message that caused it
    pub fn new(error: &ProcessingError, original: &ReceivedMessage) -> Self {
        let json = serde_json::from_str(original.body())
            .unwrap_or_else(|_| Value::String(original.body().to_string()));

        Self {
            error_message: ErrorMessageBody {
                json,
                error: error.to_string(),
                error_stack_trace: ErrorStackTrace {
                    error_message: error.stack_summary(),
                },
            },
        }
    }
}

// ============================================================================
// Error Reporter
// ============================================================================

/// Publishes processing failures to a dedicated error queue
///
/// Publication failure is fatal for the affected message's handling: it must
/// propagate, because only a durably recorded error permits deleting the
/// original message.
pub struct ErrorReporter {
    client: Arc<dyn QueueClient>,
    error_queue: QueueName,
}

impl ErrorReporter {
    /// Create a reporter targeting `error_queue`
    pub fn new(client: Arc<dyn QueueClient>, error_queue: QueueName) -> Self {
        Self {
            client,
            error_queue,
        }
    }

    /// Get the configured error queue
    pub fn error_queue(&self) -> &QueueName {
        &self.error_queue
    }

    /// Publish one failure as a structured record
    pub async fn publish_error(
        &self,
        error: &ProcessingError,
        original: &ReceivedMessage,
    ) -> Result<MessageId, QueueError> {
        let record = ErrorRecord::new(error, original);
        let body =
            serde_json::to_string(&record).map_err(mq_client::SerializationError::from)?;

        let record_id = self
            .client
            .send_message(&self.error_queue, Message::new(body))
            .await?;

        warn!(
            error_queue = %self.error_queue,
            original_message_id = %original.message_id,
            record_id = %record_id,
            error = %error,
            "Processing failure republished to error queue"
        );

        Ok(record_id)
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("error_queue", &self.error_queue)
            .finish_non_exhaustive()
    }
}
