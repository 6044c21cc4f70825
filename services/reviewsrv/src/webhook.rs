//! Slack webhook delivery
//!
//! `Notifier` is the seam the pipeline posts through, so tests can swap in
//! a recording implementation without any network.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, ReviewSrvError};
use crate::message::SlackMessage;

/// Message delivery endpoint
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver one message
    async fn post(&self, message: &SlackMessage) -> Result<()>;
}

/// Slack incoming-webhook notifier
pub struct SlackWebhook {
    client: Client,
    url: String,
}

impl SlackWebhook {
    /// Create a notifier posting to the given webhook URL
    pub fn new(client: Client, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(ReviewSrvError::config("Slack webhook URL is empty"));
        }

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn post(&self, message: &SlackMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| ReviewSrvError::notify(format!("Failed to post to Slack: {}", e)))?;

        if !response.status().is_success() {
            return Err(ReviewSrvError::notify(format!(
                "Slack webhook returned status: {}",
                response.status()
            )));
        }

        Ok(())
    }
}
