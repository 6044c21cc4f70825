//! Seen-record store abstraction
//!
//! Provides a unified interface for the dedup marker storage,
//! supporting multiple backends (Redis, in-memory).
//!
//! # Key Components
//!
//! - **SeenStore trait**: Conditional-insert key-value operations
//! - **RedisSeenStore**: Production backend over a pooled Redis connection
//! - **MemorySeenStore**: In-memory backend for testing

pub mod traits;

#[cfg(feature = "redis-backend")]
pub mod redis_impl;

pub mod memory_impl;

// Re-exports
pub use traits::{PutOutcome, SeenStore};

#[cfg(feature = "redis-backend")]
pub use redis_impl::{RedisSeenStore, RedisStoreConfig};

pub use memory_impl::MemorySeenStore;

/// Helper functions for common operations
pub mod helpers {
    use super::{MemorySeenStore, SeenStore};
    use std::sync::Arc;

    /// Create an in-memory store for unit testing
    ///
    /// This creates a MemorySeenStore that doesn't require any external
    /// services. Suitable for unit tests that should not depend on Redis.
    ///
    /// # Example
    /// ```
    /// use review_store::helpers::create_test_store;
    ///
    /// let store = create_test_store();
    /// // Use store in tests...
    /// ```
    pub fn create_test_store() -> Arc<dyn SeenStore> {
        Arc::new(MemorySeenStore::new())
    }

    /// Create a concrete MemorySeenStore for unit testing
    ///
    /// Use this when you need direct access to MemorySeenStore methods
    /// (e.g., for inspecting stored entries in tests).
    pub fn create_test_memory_store() -> Arc<MemorySeenStore> {
        Arc::new(MemorySeenStore::new())
    }
}
