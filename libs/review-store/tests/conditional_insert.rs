//! Consistency tests for seen-store implementations
//!
//! This module ensures that MemorySeenStore and RedisSeenStore behave
//! consistently. Redis tests are ignored by default and require a running
//! Redis instance.
//!
//! Run all tests (including Redis): `cargo test --package review-store --test conditional_insert -- --ignored`

// Allow unwrap() in tests for cleaner test code
#![allow(clippy::disallowed_methods)]

use std::sync::Arc;

use review_store::helpers::create_test_store;
use review_store::{MemorySeenStore, PutOutcome, SeenStore};

const REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Helper to create a unique test key
fn test_key(suffix: &str) -> String {
    format!("test:conditional:{}:{}", uuid::Uuid::new_v4(), suffix)
}

// ============================================================================
// Conditional Insert Semantics
// ============================================================================

#[tokio::test]
async fn test_memory_put_if_absent() {
    let store = MemorySeenStore::new();
    let key = test_key("put");

    let first = store.put_if_absent(&key, "v1").await.unwrap();
    assert_eq!(first, PutOutcome::Inserted);

    let second = store.put_if_absent(&key, "v2").await.unwrap();
    assert_eq!(second, PutOutcome::AlreadyExists);

    // The losing write must not clobber the original value
    assert_eq!(store.get(&key).await.unwrap(), Some("v1".to_string()));
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_put_if_absent() {
    use review_store::RedisSeenStore;

    let store = RedisSeenStore::new(REDIS_URL).await.unwrap();
    let key = test_key("put");

    let first = store.put_if_absent(&key, "v1").await.unwrap();
    assert_eq!(first, PutOutcome::Inserted);

    let second = store.put_if_absent(&key, "v2").await.unwrap();
    assert_eq!(second, PutOutcome::AlreadyExists);

    // The losing write must not clobber the original value
    assert_eq!(store.get(&key).await.unwrap(), Some("v1".to_string()));
}

#[tokio::test]
async fn test_memory_get_missing() {
    let store = MemorySeenStore::new();
    assert_eq!(store.get(&test_key("missing")).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_get_missing() {
    use review_store::RedisSeenStore;

    let store = RedisSeenStore::new(REDIS_URL).await.unwrap();
    assert_eq!(store.get(&test_key("missing")).await.unwrap(), None);
}

// ============================================================================
// At-Most-Once Under Concurrency
// ============================================================================

/// Many tasks racing the same key must produce exactly one `Inserted`.
#[tokio::test]
async fn test_memory_concurrent_insert_single_winner() {
    let store: Arc<dyn SeenStore> = Arc::new(MemorySeenStore::new());
    let key = test_key("race");

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = Arc::clone(&store);
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            store.put_if_absent(&key, &format!("writer-{}", i)).await
        }));
    }

    let mut inserted = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.is_inserted() {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);

    // The stored value belongs to the single winner
    let value = store.get(&key).await.unwrap().unwrap();
    assert!(value.starts_with("writer-"));
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_concurrent_insert_single_winner() {
    use review_store::RedisSeenStore;

    let store: Arc<dyn SeenStore> = Arc::new(RedisSeenStore::new(REDIS_URL).await.unwrap());
    let key = test_key("race");

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = Arc::clone(&store);
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            store.put_if_absent(&key, &format!("writer-{}", i)).await
        }));
    }

    let mut inserted = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.is_inserted() {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);
}

// ============================================================================
// Trait Object Introspection
// ============================================================================

#[tokio::test]
async fn test_downcast_through_trait_object() {
    let store = create_test_store();
    store.put_if_absent(&test_key("a"), "1").await.unwrap();
    store.put_if_absent(&test_key("b"), "2").await.unwrap();

    let memory = store
        .as_any()
        .downcast_ref::<MemorySeenStore>()
        .expect("memory-backed store");
    assert_eq!(memory.len(), 2);
}
