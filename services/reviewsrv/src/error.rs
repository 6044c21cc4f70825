//! Error handling for the review watcher service
//!
//! This module provides error type definitions and conversions used across
//! the fetch, dedup and notify stages.

use thiserror::Error;

/// Review Service Error Type
#[derive(Error, Debug)]
pub enum ReviewSrvError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Store feed download or decode errors
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// Seen-record storage errors
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Data serialization and deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Webhook delivery errors
    #[error("Notify error: {0}")]
    NotifyError(String),

    /// Internal task errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for the review watcher service
pub type Result<T> = std::result::Result<T, ReviewSrvError>;

// Conversion from reqwest::Error
impl From<reqwest::Error> for ReviewSrvError {
    fn from(err: reqwest::Error) -> Self {
        ReviewSrvError::HttpError(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ReviewSrvError {
    fn from(err: serde_json::Error) -> Self {
        ReviewSrvError::SerializationError(format!("JSON error: {err}"))
    }
}

// Conversion from figment::Error
impl From<figment::Error> for ReviewSrvError {
    fn from(err: figment::Error) -> Self {
        ReviewSrvError::ConfigError(err.to_string())
    }
}

// Conversion from anyhow::Error (seen-store operations)
impl From<anyhow::Error> for ReviewSrvError {
    fn from(err: anyhow::Error) -> Self {
        ReviewSrvError::StorageError(format!("{err:#}"))
    }
}

// Helper methods for creating errors
impl ReviewSrvError {
    pub fn config(msg: impl Into<String>) -> Self {
        ReviewSrvError::ConfigError(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        ReviewSrvError::FetchError(msg.into())
    }

    pub fn notify(msg: impl Into<String>) -> Self {
        ReviewSrvError::NotifyError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ReviewSrvError::InternalError(msg.into())
    }
}
