//! Tests for the mq-client library module.

use super::*;

#[test]
fn test_queue_name_validation() {
    // Valid names
    assert!(QueueName::new("test-queue".to_string()).is_ok());
    assert!(QueueName::new("queue_123".to_string()).is_ok());
    assert!(QueueName::new("a".to_string()).is_ok());

    // Invalid names
    assert!(QueueName::new("".to_string()).is_err());
    assert!(QueueName::new("-leading-hyphen".to_string()).is_err());
    assert!(QueueName::new("trailing-hyphen-".to_string()).is_err());
    assert!(QueueName::new("double--hyphen".to_string()).is_err());
    assert!(QueueName::new("special@chars".to_string()).is_err());
}

#[test]
fn test_message_id_generation() {
    let id1 = MessageId::new();
    let id2 = MessageId::new();
    assert_ne!(id1, id2);
    assert!(!id1.as_str().is_empty());
}

#[test]
fn test_message_builder() {
    let message = Message::new("test body")
        .with_attribute("key".to_string(), "value".to_string())
        .with_attribute("other".to_string(), "thing".to_string());

    assert_eq!(message.body, "test body");
    assert_eq!(message.attributes.get("key"), Some(&"value".to_string()));
    assert_eq!(message.attributes.get("other"), Some(&"thing".to_string()));
}

#[test]
fn test_factory_creates_usable_client() {
    let client = QueueClientFactory::create_test_client();

    let queue = QueueName::new("smoke".to_string()).unwrap();
    tokio_test::block_on(async {
        client.create_queue(&queue).await.unwrap();
        client
            .send_message(&queue, Message::new("hello"))
            .await
            .unwrap();
        let received = client
            .receive_message(&queue, chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(received.unwrap().body(), "hello");
    });
}
