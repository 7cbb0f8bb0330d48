//! Tests for consumer configuration.

use super::*;

#[test]
fn test_config_defaults() {
    let config = ConsumerConfig::new(QueueName::new("orders".to_string()).unwrap());

    assert_eq!(config.max_messages_per_poll, 10);
    assert_eq!(config.poll_timeout(), chrono::Duration::seconds(5));
    assert_eq!(config.idle_backoff(), std::time::Duration::from_millis(250));
}

#[test]
fn test_error_queue_derived_from_source() {
    let config = ConsumerConfig::new(QueueName::new("orders".to_string()).unwrap());

    let error_queue = config.resolved_error_queue().unwrap();

    assert_eq!(error_queue.as_str(), "orders-errors");
}

#[test]
fn test_explicit_error_queue_wins() {
    let config = ConsumerConfig::new(QueueName::new("orders".to_string()).unwrap())
        .with_error_queue(QueueName::new("failures".to_string()).unwrap());

    let error_queue = config.resolved_error_queue().unwrap();

    assert_eq!(error_queue.as_str(), "failures");
}

#[test]
fn test_error_queue_derivation_can_fail() {
    // Source name long enough that the "-errors" suffix exceeds the limit
    let long_name = "q".repeat(258);
    let config = ConsumerConfig::new(QueueName::new(long_name).unwrap());

    assert!(config.resolved_error_queue().is_err());
}

#[test]
fn test_deserialize_from_yaml_with_defaults() {
    let yaml = "source_queue: orders\n";

    let config: ConsumerConfig = config::Config::builder()
        .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert_eq!(config.source_queue.as_str(), "orders");
    assert!(config.error_queue.is_none());
    assert_eq!(config.max_messages_per_poll, 10);
    assert_eq!(config.poll_timeout_secs, 5);
    assert_eq!(config.idle_backoff_ms, 250);
}

#[test]
fn test_deserialize_rejects_wrong_types() {
    let yaml = "source_queue: orders\nmax_messages_per_poll: lots\n";

    let result = config::Config::builder()
        .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
        .build()
        .unwrap()
        .try_deserialize::<ConsumerConfig>();

    assert!(result.is_err());
}
