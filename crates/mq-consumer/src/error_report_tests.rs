//! Tests for error-queue republication.

use super::*;
use crate::error::ProcessingError;
use mq_client::{MessageId, QueueClientFactory, ReceiptHandle, Timestamp};
use serde_json::json;
use std::collections::HashMap;

fn received(body: &str) -> ReceivedMessage {
    ReceivedMessage {
        message_id: MessageId::new(),
        body: body.to_string(),
        attributes: HashMap::new(),
        receipt_handle: ReceiptHandle::new(
            "receipt".to_string(),
            Timestamp::from_datetime(chrono::Utc::now() + chrono::Duration::seconds(30)),
        ),
        delivery_count: 1,
        delivered_at: Timestamp::now(),
    }
}

fn handler_error(description: &str) -> ProcessingError {
    ProcessingError::Handler(description.to_string().into())
}

// ============================================================================
// Wire Shape Tests
// ============================================================================

/// Verify the serialized record matches the stable wire shape exactly.
#[test]
fn test_record_wire_shape() {
    let record = ErrorRecord::new(&handler_error("boom"), &received(r#"{"input": 0}"#));

    let serialized = serde_json::to_value(&record).unwrap();

    assert_eq!(
        serialized,
        json!({
            "error-message": {
                "json": {"input": 0},
                "error": "message handler failed: boom",
                "errorStackTrace": {
                    "errorMessage": "message handler failed: boom: boom"
                }
            }
        })
    );
}

/// Verify structured bodies are embedded as parsed JSON.
#[test]
fn test_record_embeds_parsed_content() {
    let record = ErrorRecord::new(
        &handler_error("boom"),
        &received(r#"{"nested": {"value": [1, 2]}}"#),
    );

    assert_eq!(
        record.error_message.json,
        json!({"nested": {"value": [1, 2]}})
    );
}

/// Verify non-JSON bodies fall back to the raw string.
#[test]
fn test_record_falls_back_to_raw_content() {
    let record = ErrorRecord::new(&handler_error("boom"), &received("blah"));

    assert_eq!(record.error_message.json, json!("blah"));
}

/// Verify a record round-trips through its serialized form.
#[test]
fn test_record_round_trip() {
    let record = ErrorRecord::new(&handler_error("boom"), &received(r#"{"k": "v"}"#));

    let serialized = serde_json::to_string(&record).unwrap();
    let parsed: ErrorRecord = serde_json::from_str(&serialized).unwrap();

    assert_eq!(parsed.error_message.json, record.error_message.json);
    assert_eq!(parsed.error_message.error, record.error_message.error);
}

// ============================================================================
// Publication Tests
// ============================================================================

/// Verify publishing lands exactly one record on the error queue.
#[tokio::test]
async fn test_publish_error_lands_on_error_queue() {
    // Arrange
    let client = QueueClientFactory::create_test_client();
    let error_queue = QueueName::new("orders-errors".to_string()).unwrap();
    client.create_queue(&error_queue).await.unwrap();
    let reporter = ErrorReporter::new(client.clone(), error_queue.clone());

    // Act
    let record_id = reporter
        .publish_error(&handler_error("boom"), &received(r#"{"input": 0}"#))
        .await
        .unwrap();

    // Assert
    assert!(!record_id.as_str().is_empty());

    let published = client
        .receive_message(&error_queue, chrono::Duration::seconds(1))
        .await
        .unwrap()
        .expect("Error record should be on the error queue");

    let record: ErrorRecord = serde_json::from_str(published.body()).unwrap();
    assert_eq!(record.error_message.json, json!({"input": 0}));
    assert!(record.error_message.error.contains("boom"));

    let nothing_else = client
        .receive_message(&error_queue, chrono::Duration::seconds(1))
        .await
        .unwrap();
    assert!(nothing_else.is_none(), "Exactly one record expected");
}

/// Verify a failing publication surfaces instead of being swallowed.
#[tokio::test]
async fn test_publish_failure_propagates() {
    // Arrange - error queue was never created
    let client = QueueClientFactory::create_test_client();
    let missing_queue = QueueName::new("never-created".to_string()).unwrap();
    let reporter = ErrorReporter::new(client, missing_queue);

    // Act
    let result = reporter
        .publish_error(&handler_error("boom"), &received("blah"))
        .await;

    // Assert
    assert!(matches!(result, Err(QueueError::QueueNotFound { .. })));
}
