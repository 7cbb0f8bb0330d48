//! Message filters and filter chains.
//!
//! Filters are pure, stateless accept/reject/transform functions applied to a
//! message before business processing. The runtime relies on statelessness:
//! a rejected message may be redelivered and refiltered at any time.

use mq_client::ReceivedMessage;
use std::sync::Arc;

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

/// A pure transformation applied to a message before processing
///
/// Returning `None` rejects the message; returning `Some` passes the
/// (possibly transformed) message along the chain. Implementations must be
/// total and side-effect free.
pub trait MessageFilter: Send + Sync {
    fn apply(&self, message: &ReceivedMessage) -> Option<ReceivedMessage>;
}

impl<F> MessageFilter for F
where
    F: Fn(&ReceivedMessage) -> Option<ReceivedMessage> + Send + Sync,
{
    fn apply(&self, message: &ReceivedMessage) -> Option<ReceivedMessage> {
        self(message)
    }
}

/// Ordered sequence of filters applied left-to-right
///
/// Each filter sees the output of the previous one; the first rejection
/// short-circuits the chain. An empty chain accepts every message unchanged.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn MessageFilter>>,
}

impl FilterChain {
    /// Create an empty (identity) filter chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the end of the chain
    pub fn with_filter(mut self, filter: impl MessageFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Number of filters in the chain
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check whether the chain is the identity
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the chain; `None` means the message was rejected
    pub fn apply(&self, message: ReceivedMessage) -> Option<ReceivedMessage> {
        let mut current = message;
        for filter in &self.filters {
            match filter.apply(&current) {
                Some(next) => current = next,
                None => return None,
            }
        }
        Some(current)
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}
