//! Trait definitions for the seen-record store abstraction

use anyhow::Result;
use async_trait::async_trait;
use std::any::Any;

/// Outcome of a conditional insert
///
/// `AlreadyExists` is not an error: it is the defined signal that the key
/// was recorded by an earlier (or concurrent) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The key did not exist and the value was written
    Inserted,
    /// The key already existed; nothing was written
    AlreadyExists,
}

impl PutOutcome {
    /// True when the conditional insert actually wrote the value
    pub fn is_inserted(self) -> bool {
        matches!(self, PutOutcome::Inserted)
    }
}

/// Seen-record Storage Trait
///
/// The atomic `put_if_absent` is the sole mutation primitive, and the only
/// concurrency-safety mechanism the callers rely on: whichever task inserts
/// a key first owns it, regardless of how many runs race on the same key.
///
/// Implementations:
/// - `RedisSeenStore`: Production Redis backend (SET NX)
/// - `MemorySeenStore`: In-memory backend for testing
#[async_trait]
pub trait SeenStore: Send + Sync + 'static {
    // ========== Introspection ==========

    /// Allow downcasting to concrete types
    ///
    /// This enables runtime type checking and conversion to specific
    /// implementations like RedisSeenStore or MemorySeenStore when needed.
    fn as_any(&self) -> &dyn Any;

    // ========== Conditional Key-Value Operations ==========

    /// Insert the value only if the key does not exist yet
    ///
    /// Atomic with respect to concurrent callers: exactly one of any number
    /// of racing inserts on the same key observes `Inserted`.
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<PutOutcome>;

    /// Get value by key
    ///
    /// Returns `None` when the key has never been inserted.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}
