//! Review watcher service library
//!
//! Polls the App Store and Google Play for new customer reviews, records
//! each one in a seen-record store, and posts the ones this run saw first
//! to a Slack webhook. The conditional insert in the store is the only
//! coordination point, so concurrent runs stay at-most-once per review.

pub mod config;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod review;
pub mod sources;
pub mod webhook;

pub use config::Config;
pub use error::{Result, ReviewSrvError};
pub use message::{review_message, watch_message, Attachment, SlackMessage};
pub use pipeline::{
    AppOutcome, AppReport, Pipeline, RunSummary, StreamDisposition, StreamReport,
};
pub use review::{Review, SeenAppRecord, SeenReviewRecord, StoreKind, StreamKey, TrackedApp};
pub use sources::{AppStoreSource, GooglePlaySource, ReviewSource};
pub use webhook::{Notifier, SlackWebhook};

/// Service information
pub const SERVICE_NAME: &str = "reviewsrv";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
