//! Tests for consumer error types.

use super::*;
use std::fmt;

/// Error type with a nested cause, for exercising the summary chain.
#[derive(Debug)]
struct Outer {
    cause: Inner,
}

#[derive(Debug)]
struct Inner;

impl fmt::Display for Outer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "outer failed")
    }
}

impl fmt::Display for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inner cause")
    }
}

impl std::error::Error for Outer {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

impl std::error::Error for Inner {}

#[test]
fn test_handler_error_display() {
    let error = ProcessingError::Handler("database unavailable".into());
    assert_eq!(
        error.to_string(),
        "message handler failed: database unavailable"
    );
}

#[test]
fn test_stack_summary_includes_cause_chain() {
    let error = ProcessingError::Handler(Box::new(Outer { cause: Inner }));

    let summary = error.stack_summary();

    assert!(summary.starts_with("message handler failed: outer failed"));
    assert!(summary.contains("inner cause"));
}

#[test]
fn test_panicked_error_display() {
    let error = ProcessingError::Panicked {
        reason: "index out of bounds".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "message handling panicked: index out of bounds"
    );
}

#[test]
fn test_transport_error_wraps_queue_error() {
    let queue_error = QueueError::QueueNotFound {
        queue_name: "orders".to_string(),
    };

    let error: ConsumerError = queue_error.into();

    assert!(matches!(error, ConsumerError::Transport(_)));
    assert!(error.to_string().contains("orders"));
}
