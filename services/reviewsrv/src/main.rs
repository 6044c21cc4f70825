//! reviewsrv - App store review watcher
//!
//! One-shot run: fetch the recent reviews for every configured app, post
//! the ones not seen before to Slack, and record them so the next run
//! stays quiet. App failures are logged and reported, never fatal.

use std::sync::Arc;

use review_store::{RedisSeenStore, SeenStore};
use reviewsrv::config::Config;
use reviewsrv::pipeline::Pipeline;
use reviewsrv::sources::{self, AppStoreSource, GooglePlaySource, ReviewSource};
use reviewsrv::webhook::SlackWebhook;
use reviewsrv::{Result, SERVICE_NAME, SERVICE_VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::load()?;
    config.validate()?;

    tracing::info!("Starting {} v{}", SERVICE_NAME, SERVICE_VERSION);

    let store: Arc<dyn SeenStore> = Arc::new(RedisSeenStore::new(&config.redis.url).await?);
    tracing::info!("Connected to seen-record store at {}", config.redis.url);

    let client = sources::http_client(config.http_timeout())?;
    let feed_sources: Vec<Arc<dyn ReviewSource>> = vec![
        Arc::new(AppStoreSource::new(client.clone())),
        Arc::new(GooglePlaySource::new(client.clone())),
    ];
    let notifier = Arc::new(SlackWebhook::new(client, config.slack.webhook_url.clone())?);

    let pipeline = Pipeline::new(
        store,
        feed_sources,
        notifier,
        config.redis.key_prefix.clone(),
    );

    let apps = config.tracked_apps();
    if apps.is_empty() {
        tracing::warn!("No apps configured, nothing to poll");
        return Ok(());
    }

    let summary = pipeline.run(apps).await;

    tracing::info!(
        "Run {} finished: {} apps completed, {} failed, {} new streams, {} notifications delivered",
        summary.run_id,
        summary.completed_apps(),
        summary.failed_apps(),
        summary.first_seen_streams(),
        summary.delivered()
    );

    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Log level comes from the environment, defaulting to info
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("{}=info", env!("CARGO_PKG_NAME")));

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
