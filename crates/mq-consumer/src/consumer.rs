//! The consumer actor.
//!
//! One `Consumer` owns one queue's consumption: it receives messages one at a
//! time, runs each through the filter chain, hands accepted messages to the
//! processor callback, and converts failures into error-queue records. No two
//! callback invocations overlap within one consumer instance; scaling out
//! means running more instances, and receipt handles keep concurrent polling
//! of the same queue race-free.

use crate::config::ConsumerConfig;
use crate::error::{BoxError, ConsumerError, ProcessingError};
use crate::error_report::ErrorReporter;
use crate::filter::{FilterChain, MessageFilter};
use crate::schema::SchemaValidator;
use async_trait::async_trait;
use mq_client::{QueueClient, QueueName, ReceivedMessage};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

#[cfg(test)]
#[path = "consumer_tests.rs"]
mod tests;

// ============================================================================
// Boundary Traits
// ============================================================================

/// The business-logic boundary
///
/// Returning `Ok` acknowledges the message, causing the consumer to delete
/// it. Returning `Err` (or panicking) routes the message to the error queue
/// before deletion.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    async fn process(&self, message: &ReceivedMessage) -> Result<(), BoxError>;
}

/// Observer hook for message outcomes (test and monitoring seam)
///
/// Notifications are synchronous and carry no ordering guarantee relative to
/// queue deletion.
pub trait ConsumerListener: Send + Sync {
    fn on_processed(&self, _message: &ReceivedMessage) {}
    fn on_rejected(&self, _message: &ReceivedMessage) {}
}

// ============================================================================
// Outcome Types
// ============================================================================

/// Terminal state of one message's handling
#[derive(Debug)]
pub enum ProcessingOutcome {
    /// Accepted by every filter and acknowledged by the processor; deleted
    Processed(ReceivedMessage),

    /// Rejected by the filter chain; left undeleted for the visibility
    /// timeout to reclaim
    Rejected(ReceivedMessage),

    /// Validation or processing failed; recorded on the error queue, then
    /// deleted
    Failed {
        error: ProcessingError,
        message: ReceivedMessage,
    },
}

impl ProcessingOutcome {
    /// Check if the message was fully processed
    pub fn is_processed(&self) -> bool {
        matches!(self, ProcessingOutcome::Processed(_))
    }

    /// Check if the message was rejected by the filter chain
    pub fn is_rejected(&self) -> bool {
        matches!(self, ProcessingOutcome::Rejected(_))
    }

    /// Check if handling failed and was error-reported
    pub fn is_failed(&self) -> bool {
        matches!(self, ProcessingOutcome::Failed { .. })
    }
}

/// What the isolated handler task decided
enum HandlerVerdict {
    Rejected,
    Processed(ReceivedMessage),
    Failed(ProcessingError),
}

// ============================================================================
// Consumer
// ============================================================================

/// Single logical owner of one queue's consumption
pub struct Consumer {
    client: Arc<dyn QueueClient>,
    config: ConsumerConfig,
    filters: FilterChain,
    processor: Arc<dyn MessageProcessor>,
    error_reporter: ErrorReporter,
    validator: Option<Arc<SchemaValidator>>,
    listeners: Vec<Arc<dyn ConsumerListener>>,
}

impl Consumer {
    /// Create a consumer for the configured source queue
    ///
    /// The error reporter shares the consumer's queue client and targets the
    /// configured (or derived) error queue.
    pub fn new(
        client: Arc<dyn QueueClient>,
        config: ConsumerConfig,
        processor: Arc<dyn MessageProcessor>,
    ) -> Result<Self, ConsumerError> {
        let error_queue = config.resolved_error_queue()?;
        let error_reporter = ErrorReporter::new(Arc::clone(&client), error_queue);

        Ok(Self {
            client,
            config,
            filters: FilterChain::new(),
            processor,
            error_reporter,
            validator: None,
            listeners: Vec::new(),
        })
    }

    /// Append a filter to the chain
    pub fn with_filter(mut self, filter: impl MessageFilter + 'static) -> Self {
        self.filters = self.filters.with_filter(filter);
        self
    }

    /// Replace the whole filter chain
    pub fn with_filter_chain(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    /// Attach a schema validator applied to accepted messages
    pub fn with_validator(mut self, validator: SchemaValidator) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Register an outcome listener
    pub fn with_listener(mut self, listener: Arc<dyn ConsumerListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Get the source queue
    pub fn source_queue(&self) -> &QueueName {
        &self.config.source_queue
    }

    /// Get the resolved error queue
    pub fn error_queue(&self) -> &QueueName {
        self.error_reporter.error_queue()
    }

    /// Apply the per-message protocol to one received message
    ///
    /// Filtering, validation, and the processor callback run inside a spawned
    /// task so that a panic anywhere in that span is contained: it surfaces
    /// as a `Failed` outcome instead of tearing down the consumer. Transport
    /// failures (delete, error-queue publish) propagate as `Err`.
    pub async fn handle_message(
        &self,
        message: ReceivedMessage,
    ) -> Result<ProcessingOutcome, ConsumerError> {
        let original = message.clone();

        let filters = self.filters.clone();
        let validator = self.validator.clone();
        let processor = Arc::clone(&self.processor);

        let handler: JoinHandle<HandlerVerdict> = tokio::spawn(async move {
            let accepted = match filters.apply(message) {
                Some(accepted) => accepted,
                None => return HandlerVerdict::Rejected,
            };

            if let Some(validator) = validator.as_deref() {
                if let Err(failure) = validator.validate(&accepted) {
                    return HandlerVerdict::Failed(ProcessingError::Validation(failure));
                }
            }

            match processor.process(&accepted).await {
                Ok(()) => HandlerVerdict::Processed(accepted),
                Err(source) => HandlerVerdict::Failed(ProcessingError::Handler(source)),
            }
        });

        let verdict = match handler.await {
            Ok(verdict) => verdict,
            Err(join_error) => HandlerVerdict::Failed(ProcessingError::Panicked {
                reason: panic_reason(join_error),
            }),
        };

        match verdict {
            HandlerVerdict::Rejected => {
                debug!(
                    queue = %self.config.source_queue,
                    message_id = %original.message_id,
                    "Message rejected by filter chain; left for visibility timeout"
                );

                for listener in &self.listeners {
                    listener.on_rejected(&original);
                }

                Ok(ProcessingOutcome::Rejected(original))
            }

            HandlerVerdict::Processed(processed) => {
                self.client
                    .delete_message(original.receipt_handle.clone())
                    .await?;

                debug!(
                    queue = %self.config.source_queue,
                    message_id = %original.message_id,
                    "Message processed and deleted"
                );

                for listener in &self.listeners {
                    listener.on_processed(&processed);
                }

                Ok(ProcessingOutcome::Processed(processed))
            }

            HandlerVerdict::Failed(error) => {
                // Record durably first: deletion must never lose information
                self.error_reporter.publish_error(&error, &original).await?;
                self.client
                    .delete_message(original.receipt_handle.clone())
                    .await?;

                warn!(
                    queue = %self.config.source_queue,
                    message_id = %original.message_id,
                    error = %error,
                    "Message failed; error recorded and original deleted"
                );

                Ok(ProcessingOutcome::Failed {
                    error,
                    message: original,
                })
            }
        }
    }

    /// Poll the source queue until shutdown is signalled
    ///
    /// Messages are handled strictly sequentially. Once shutdown is observed
    /// no further receives are issued; the in-flight message finishes first.
    /// Transport failures abort the loop and surface to the caller.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ConsumerError> {
        info!(
            queue = %self.config.source_queue,
            error_queue = %self.error_reporter.error_queue(),
            filters = self.filters.len(),
            "Consumer started"
        );

        while !*shutdown.borrow() {
            let messages = self
                .client
                .receive_messages(
                    &self.config.source_queue,
                    self.config.max_messages_per_poll,
                    self.config.poll_timeout(),
                )
                .await?;

            if messages.is_empty() {
                // Idle queue: back off, but wake immediately on shutdown
                tokio::select! {
                    _ = tokio::time::sleep(self.config.idle_backoff()) => {}
                    _ = shutdown.changed() => {}
                }
                continue;
            }

            let mut batch = messages.into_iter();
            while let Some(message) = batch.next() {
                self.handle_message(message).await?;

                if *shutdown.borrow() {
                    let remaining = batch.len();
                    if remaining > 0 {
                        debug!(
                            queue = %self.config.source_queue,
                            remaining,
                            "Shutdown mid-batch; unhandled messages return via visibility timeout"
                        );
                    }
                    break;
                }
            }
        }

        info!(queue = %self.config.source_queue, "Consumer stopped");
        Ok(())
    }

    /// Spawn the poll loop and return a handle controlling it
    pub fn start(self) -> ConsumerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });

        ConsumerHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Handle to a running consumer
pub struct ConsumerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<Result<(), ConsumerError>>,
}

impl ConsumerHandle {
    /// Signal the consumer to stop after its in-flight message
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the consumer loop to finish
    pub async fn join(self) -> Result<(), ConsumerError> {
        match self.join.await {
            Ok(result) => result,
            Err(join_error) => Err(ConsumerError::Aborted {
                reason: join_error.to_string(),
            }),
        }
    }

    /// Signal shutdown and wait for completion
    pub async fn stop(self) -> Result<(), ConsumerError> {
        self.shutdown();
        self.join().await
    }
}

/// Extract a readable reason from a handler task failure
fn panic_reason(join_error: JoinError) -> String {
    if join_error.is_panic() {
        match join_error.into_panic().downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "non-string panic payload".to_string(),
            },
        }
    } else {
        "handler task cancelled".to_string()
    }
}
