//! Redis-backed seen-record store with connection pooling
//!
//! The conditional insert maps to `SET key value NX`: an `OK` reply means
//! the key was written, a nil reply means it already existed.

use crate::traits::{PutOutcome, SeenStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;

/// Redis connection pool configuration
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections
    pub min_idle: Option<u32>,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
    /// Maximum lifetime of a connection in seconds
    pub max_lifetime: Option<u64>,
    /// Idle timeout in seconds
    pub idle_timeout: Option<u64>,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            max_connections: 16,
            min_idle: Some(2),
            connection_timeout: 5,
            max_lifetime: Some(3600), // 1 hour
            idle_timeout: Some(600),  // 10 minutes
        }
    }
}

impl RedisStoreConfig {
    /// Create config from URL with default pool settings
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Redis seen-record store with connection pooling
pub struct RedisSeenStore {
    pool: Arc<Pool<RedisConnectionManager>>,
    url: String,
}

impl std::fmt::Debug for RedisSeenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSeenStore")
            .field("url", &self.url)
            .field("pool_state", &self.pool.state())
            .finish()
    }
}

impl RedisSeenStore {
    /// Create a new store with default pool configuration
    pub async fn new(url: &str) -> Result<Self> {
        Self::with_config(RedisStoreConfig::from_url(url)).await
    }

    /// Create a new store with custom configuration
    pub async fn with_config(config: RedisStoreConfig) -> Result<Self> {
        let store = Self::with_config_no_ping(config).await?;

        // Test the connection
        store.ping().await?;

        Ok(store)
    }

    /// Create a store without performing a PING test (for tests or special cases)
    ///
    /// This avoids requiring a live Redis server when the store won't be used.
    pub async fn with_config_no_ping(config: RedisStoreConfig) -> Result<Self> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .context("Failed to create Redis connection manager")?;

        let mut pool_builder = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.connection_timeout));

        if let Some(min_idle) = config.min_idle {
            pool_builder = pool_builder.min_idle(Some(min_idle));
        }

        if let Some(max_lifetime) = config.max_lifetime {
            pool_builder = pool_builder.max_lifetime(Some(Duration::from_secs(max_lifetime)));
        }

        if let Some(idle_timeout) = config.idle_timeout {
            pool_builder = pool_builder.idle_timeout(Some(Duration::from_secs(idle_timeout)));
        }

        let pool = pool_builder
            .build(manager)
            .await
            .context("Failed to build Redis connection pool")?;

        Ok(Self {
            pool: Arc::new(pool),
            url: config.url,
        })
    }

    /// Convenience helper to create a store without ping from URL
    pub async fn new_unchecked(url: &str) -> Result<Self> {
        Self::with_config_no_ping(RedisStoreConfig::from_url(url)).await
    }

    /// Get a connection from the pool
    async fn get_connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
        self.pool
            .get()
            .await
            .context("Failed to get connection from pool")
    }

    /// PING operation - test connection
    pub async fn ping(&self) -> Result<String> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .context("Failed to ping Redis server")
    }

    /// Current pool state (connections, idle connections)
    pub fn pool_state(&self) -> bb8::State {
        self.pool.state()
    }
}

#[async_trait]
impl SeenStore for RedisSeenStore {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn put_if_absent(&self, key: &str, value: &str) -> Result<PutOutcome> {
        let mut conn = self.get_connection().await?;

        // SET ... NX replies OK when written, nil when the key exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .query_async(&mut *conn)
            .await
            .with_context(|| format!("Failed to SET NX key: {}", key))?;

        match reply {
            Some(_) => Ok(PutOutcome::Inserted),
            None => Ok(PutOutcome::AlreadyExists),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        conn.get(key)
            .await
            .with_context(|| format!("Failed to GET key: {}", key))
    }
}
