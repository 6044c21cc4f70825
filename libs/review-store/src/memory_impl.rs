//! In-memory seen-record store
//!
//! Uses DashMap for lock-free concurrent access. The entry API makes the
//! conditional insert atomic, so the at-most-once property holds under
//! concurrent tasks exactly as it does with the Redis backend.
//! Perfect for testing and offline runs.

use crate::traits::{PutOutcome, SeenStore};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory store implementation with concurrent access support
pub struct MemorySeenStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemorySeenStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no record has been stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for MemorySeenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn put_if_absent(&self, key: &str, value: &str) -> Result<PutOutcome> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(PutOutcome::AlreadyExists),
            Entry::Vacant(vacant) => {
                vacant.insert(value.to_string());
                Ok(PutOutcome::Inserted)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }
}
