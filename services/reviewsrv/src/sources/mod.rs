//! Review feed sources
//!
//! One client per marketplace. Each call fetches the most recent page of
//! reviews for one (app, locale) stream.

pub mod app_store;
pub mod google_play;

pub use app_store::AppStoreSource;
pub use google_play::GooglePlaySource;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, ReviewSrvError};
use crate::review::{Review, StoreKind};

/// A marketplace review feed
#[async_trait]
pub trait ReviewSource: Send + Sync + 'static {
    /// Store this source serves
    fn store(&self) -> StoreKind;

    /// Fetch the most recent reviews for one app in one locale
    async fn list_reviews(&self, app_id: &str, locale: &str) -> Result<Vec<Review>>;
}

/// Build the HTTP client shared by the sources and the webhook
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ReviewSrvError::HttpError(format!("Failed to build HTTP client: {}", e)))
}
