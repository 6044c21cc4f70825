//! App Store review feed client
//!
//! Reads the public iTunes customer-reviews RSS feed in its JSON rendering.
//! The feed nests every value under a `label` field, and `feed.entry` may
//! be absent, a single object, or an array depending on how many reviews
//! the storefront returns.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::ReviewSource;
use crate::error::{Result, ReviewSrvError};
use crate::review::{Review, StoreKind};

const ITUNES_BASE_URL: &str = "https://itunes.apple.com";

/// App Store review source
pub struct AppStoreSource {
    client: Client,
    base_url: String,
}

impl AppStoreSource {
    /// Create a source using the public iTunes endpoint
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, ITUNES_BASE_URL)
    }

    /// Create a source against a custom endpoint (used by tests)
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn feed_url(&self, app_id: &str, country: &str) -> String {
        format!(
            "{}/{}/rss/customerreviews/page=1/id={}/sortby=mostrecent/json",
            self.base_url, country, app_id
        )
    }
}

#[async_trait]
impl ReviewSource for AppStoreSource {
    fn store(&self) -> StoreKind {
        StoreKind::AppStore
    }

    async fn list_reviews(&self, app_id: &str, locale: &str) -> Result<Vec<Review>> {
        let url = self.feed_url(app_id, locale);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReviewSrvError::fetch(format!("App Store request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ReviewSrvError::fetch(format!(
                "App Store feed returned status {} for {}",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReviewSrvError::fetch(format!("Failed to read App Store feed: {}", e)))?;

        parse_feed(&body)
    }
}

/// Decode a feed document into reviews
pub fn parse_feed(body: &str) -> Result<Vec<Review>> {
    let document: FeedDocument = serde_json::from_str(body)
        .map_err(|e| ReviewSrvError::fetch(format!("Failed to decode App Store feed: {}", e)))?;

    let entries = match document.feed.entry {
        None => Vec::new(),
        Some(Entries::One(entry)) => vec![*entry],
        Some(Entries::Many(entries)) => entries,
    };

    Ok(entries.into_iter().map(Review::from).collect())
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
    entry: Option<Entries>,
}

/// `feed.entry` is an object when the page has exactly one review
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entries {
    Many(Vec<FeedEntry>),
    One(Box<FeedEntry>),
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: Label,
    author: FeedAuthor,
    #[serde(rename = "im:rating")]
    rating: Option<Label>,
    title: Option<Label>,
    content: Label,
    link: Option<FeedLink>,
}

#[derive(Debug, Deserialize)]
struct Label {
    label: String,
}

#[derive(Debug, Deserialize)]
struct FeedAuthor {
    name: Label,
}

#[derive(Debug, Deserialize)]
struct FeedLink {
    attributes: LinkAttributes,
}

#[derive(Debug, Deserialize)]
struct LinkAttributes {
    href: String,
}

impl From<FeedEntry> for Review {
    fn from(entry: FeedEntry) -> Self {
        let score = entry
            .rating
            .as_ref()
            .and_then(|r| r.label.parse::<u8>().ok())
            .unwrap_or(0);

        Review {
            id: entry.id.label,
            score,
            title: entry.title.map(|t| t.label),
            text: entry.content.label,
            author: entry.author.name.label,
            url: entry.link.map(|l| l.attributes.href),
            // The JSON rendering of the feed does not carry a usable date
            date: None,
        }
    }
}
