//! Queue provider implementations.
//!
//! Production deployments inject their own [`crate::client::QueueProvider`]
//! implementation; this module ships the in-memory provider used by tests
//! and local development.

pub mod memory;

pub use memory::InMemoryProvider;
