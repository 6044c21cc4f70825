//! Domain types for tracked apps, review streams and seen records
//!
//! A review stream is one (store, locale, app) combination. Stream and
//! review keys share a common cache key so the storage layout stays
//! stable across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// App marketplace kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Apple App Store
    AppStore,
    /// Google Play
    GooglePlay,
}

impl StoreKind {
    /// Stable identifier used in storage keys and logs
    pub fn slug(&self) -> &'static str {
        match self {
            StoreKind::AppStore => "app-store",
            StoreKind::GooglePlay => "google-play",
        }
    }

    /// Human-readable store name used in notifications
    pub fn display_name(&self) -> &'static str {
        match self {
            StoreKind::AppStore => "App Store",
            StoreKind::GooglePlay => "Google Play",
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// One app under watch, with the locales to poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedApp {
    /// Marketplace the app lives in
    pub store: StoreKind,
    /// Store-specific app identifier
    pub app_id: String,
    /// Optional display name for notifications
    pub name: Option<String>,
    /// Locales to poll (country codes or language codes, per store)
    pub locales: Vec<String>,
}

impl TrackedApp {
    /// Display label for notifications and logs, falling back to the app id
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.app_id)
    }
}

/// Identity of one review stream: (store, locale, app)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    /// Marketplace the stream belongs to
    pub store: StoreKind,
    /// Locale being polled
    pub locale: String,
    /// Store-specific app identifier
    pub app_id: String,
}

impl StreamKey {
    /// Create a stream key
    pub fn new(store: StoreKind, locale: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            store,
            locale: locale.into(),
            app_id: app_id.into(),
        }
    }

    /// Cache key shared by stream and review records
    pub fn cache_key(&self) -> String {
        format!("{}-{}-{}", self.store.slug(), self.locale, self.app_id)
    }

    /// Storage key of the stream-level seen record
    pub fn app_record_key(&self, prefix: &str) -> String {
        format!("{}:stream:{}", prefix, self.cache_key())
    }

    /// Storage key of a per-review seen record
    pub fn review_record_key(&self, prefix: &str, review_id: &str) -> String {
        format!("{}:review:{}:{}", prefix, self.cache_key(), review_id)
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// One customer review fetched from a store feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Store-assigned review identifier
    pub id: String,
    /// Star rating, 1 to 5 (0 when the feed omits it)
    pub score: u8,
    /// Review title, when the store provides one
    pub title: Option<String>,
    /// Review body
    pub text: String,
    /// Reviewer display name
    pub author: String,
    /// Permalink to the review, when the store provides one
    pub url: Option<String>,
    /// Review date as `YYYY-MM-DD`, when the store provides one
    pub date: Option<String>,
}

/// Stream-level seen record, written the first time a stream is polled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenAppRecord {
    /// When the stream was first polled
    pub first_seen: DateTime<Utc>,
}

impl SeenAppRecord {
    /// Create a record stamped with the current time
    pub fn now() -> Self {
        Self {
            first_seen: Utc::now(),
        }
    }
}

/// Per-review seen record, written once per review id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenReviewRecord {
    /// When the review was first observed
    pub seen_at: DateTime<Utc>,
    /// Review body
    pub text: String,
    /// Star rating
    pub score: u8,
    /// Permalink, when the store provides one
    pub link: Option<String>,
}

impl SeenReviewRecord {
    /// Build a record from a fetched review
    pub fn from_review(review: &Review) -> Self {
        Self {
            seen_at: Utc::now(),
            text: review.text.clone(),
            score: review.score,
            link: review.url.clone(),
        }
    }
}
