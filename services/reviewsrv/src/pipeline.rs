//! Fetch, dedup and notify orchestration
//!
//! One run polls every tracked app concurrently, one task per app. Within
//! an app the locales are fetched sequentially; a fetch failure abandons
//! the remaining locales but the streams fetched before it still flow
//! through dedup and notification. All cross-task safety rests on the
//! store's conditional insert, so a crashed or duplicate run can never
//! deliver a review twice.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use review_store::SeenStore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::message;
use crate::review::{Review, SeenAppRecord, SeenReviewRecord, StoreKind, StreamKey, TrackedApp};
use crate::sources::ReviewSource;
use crate::webhook::Notifier;

/// What happened to one review stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamDisposition {
    /// Stream seen for the first time: announced, reviews recorded silently
    FirstSeen {
        /// Review records created
        recorded: usize,
    },
    /// Known stream: unseen reviews recorded and notified
    Known {
        /// Reviews not seen before this run
        new: usize,
        /// Reviews already recorded by an earlier run
        already_seen: usize,
        /// Notifications delivered
        delivered: usize,
        /// Notifications that failed to send
        send_failures: usize,
    },
}

/// Report for one (locale) stream of an app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
    pub locale: String,
    pub disposition: StreamDisposition,
}

/// Terminal state of one app's branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOutcome {
    /// Every locale fetched and handled
    Completed,
    /// A locale fetch failed; later locales were abandoned
    FetchFailed { locale: String, error: String },
    /// A store failure or panic ended the branch
    Aborted { error: String },
}

/// Report for one tracked app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppReport {
    pub app_id: String,
    pub store: StoreKind,
    pub streams: Vec<StreamReport>,
    pub outcome: AppOutcome,
}

/// Aggregated result of one run
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub apps: Vec<AppReport>,
}

impl RunSummary {
    /// Apps whose branches ran to completion
    pub fn completed_apps(&self) -> usize {
        self.apps
            .iter()
            .filter(|app| app.outcome == AppOutcome::Completed)
            .count()
    }

    /// Apps that failed part way
    pub fn failed_apps(&self) -> usize {
        self.apps.len() - self.completed_apps()
    }

    /// Notifications delivered across all streams
    pub fn delivered(&self) -> usize {
        self.streams()
            .map(|stream| match &stream.disposition {
                StreamDisposition::Known { delivered, .. } => *delivered,
                StreamDisposition::FirstSeen { .. } => 0,
            })
            .sum()
    }

    /// Streams announced for the first time
    pub fn first_seen_streams(&self) -> usize {
        self.streams()
            .filter(|stream| matches!(stream.disposition, StreamDisposition::FirstSeen { .. }))
            .count()
    }

    fn streams(&self) -> impl Iterator<Item = &StreamReport> {
        self.apps.iter().flat_map(|app| app.streams.iter())
    }
}

/// Review polling pipeline
///
/// Cloning is cheap: the store, sources and notifier are shared behind
/// `Arc`, which is what lets each app branch run on its own task.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn SeenStore>,
    sources: HashMap<StoreKind, Arc<dyn ReviewSource>>,
    notifier: Arc<dyn Notifier>,
    key_prefix: String,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators
    pub fn new(
        store: Arc<dyn SeenStore>,
        sources: Vec<Arc<dyn ReviewSource>>,
        notifier: Arc<dyn Notifier>,
        key_prefix: impl Into<String>,
    ) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.store(), source))
            .collect();

        Self {
            store,
            sources,
            notifier,
            key_prefix: key_prefix.into(),
        }
    }

    /// Poll every app once and aggregate the per-app reports
    ///
    /// App failures are contained in their report; this never returns an
    /// error and never lets one app's failure touch another.
    pub async fn run(&self, apps: Vec<TrackedApp>) -> RunSummary {
        let run_id = Uuid::new_v4();
        info!("Starting review poll {} for {} apps", run_id, apps.len());

        let mut handles = Vec::with_capacity(apps.len());
        for app in apps {
            let pipeline = self.clone();
            let identity = (app.app_id.clone(), app.store);
            handles.push((identity, tokio::spawn(async move {
                pipeline.process_app(app).await
            })));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for ((app_id, store), handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!("Branch for app {} aborted: {}", app_id, e);
                    reports.push(AppReport {
                        app_id,
                        store,
                        streams: Vec::new(),
                        outcome: AppOutcome::Aborted {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        RunSummary {
            run_id,
            apps: reports,
        }
    }

    /// Process one app: fetch its locales in order, then handle each stream
    async fn process_app(&self, app: TrackedApp) -> AppReport {
        let source = match self.sources.get(&app.store) {
            Some(source) => Arc::clone(source),
            None => {
                return AppReport {
                    app_id: app.app_id.clone(),
                    store: app.store,
                    streams: Vec::new(),
                    outcome: AppOutcome::Aborted {
                        error: format!("No source registered for store {}", app.store),
                    },
                }
            }
        };

        let mut fetched = Vec::new();
        let mut fetch_failure = None;
        for locale in &app.locales {
            debug!("Fetching reviews for {} ({})", app.app_id, locale);
            match source.list_reviews(&app.app_id, locale).await {
                Ok(reviews) => fetched.push((locale.clone(), reviews)),
                Err(e) => {
                    warn!(
                        "Fetch failed for {} ({}), abandoning remaining locales: {}",
                        app.app_id, locale, e
                    );
                    fetch_failure = Some((locale.clone(), e.to_string()));
                    break;
                }
            }
        }

        let mut streams = Vec::new();
        for (locale, reviews) in fetched {
            let key = StreamKey::new(app.store, locale.as_str(), app.app_id.as_str());
            match self.handle_stream(&app, &key, &reviews).await {
                Ok(disposition) => streams.push(StreamReport {
                    locale,
                    disposition,
                }),
                Err(e) => {
                    error!("Stream {} aborted: {}", key, e);
                    return AppReport {
                        app_id: app.app_id.clone(),
                        store: app.store,
                        streams,
                        outcome: AppOutcome::Aborted {
                            error: e.to_string(),
                        },
                    };
                }
            }
        }

        let outcome = match fetch_failure {
            Some((locale, error)) => AppOutcome::FetchFailed { locale, error },
            None => AppOutcome::Completed,
        };

        AppReport {
            app_id: app.app_id.clone(),
            store: app.store,
            streams,
            outcome,
        }
    }

    /// Dedup and notify one fetched stream
    async fn handle_stream(
        &self,
        app: &TrackedApp,
        key: &StreamKey,
        reviews: &[Review],
    ) -> Result<StreamDisposition> {
        let app_record = serde_json::to_string(&SeenAppRecord::now())?;
        let first_seen = self
            .store
            .put_if_absent(&key.app_record_key(&self.key_prefix), &app_record)
            .await?
            .is_inserted();

        if first_seen {
            info!("Now watching stream {}", key);
            // Announce the new stream; the records below still dedup its
            // backlog even when the announcement cannot be delivered
            if let Err(e) = self.notifier.post(&message::watch_message(app)).await {
                warn!("Failed to post watch message for {}: {}", key, e);
            }
        }

        // Record every fetched review concurrently; the conditional insert
        // decides which ones this run owns
        let marks = reviews.iter().map(|review| {
            let review_key = key.review_record_key(&self.key_prefix, &review.id);
            let store = Arc::clone(&self.store);
            async move {
                let record = serde_json::to_string(&SeenReviewRecord::from_review(review))?;
                let outcome = store.put_if_absent(&review_key, &record).await?;
                Ok::<_, crate::error::ReviewSrvError>(outcome)
            }
        });

        let mut new_reviews = Vec::new();
        let mut already_seen = 0;
        for (review, outcome) in reviews.iter().zip(join_all(marks).await) {
            if outcome?.is_inserted() {
                new_reviews.push(review);
            } else {
                already_seen += 1;
            }
        }

        if first_seen {
            // No historical replay: the backlog is recorded, not notified
            return Ok(StreamDisposition::FirstSeen {
                recorded: new_reviews.len(),
            });
        }

        if new_reviews.is_empty() {
            debug!("No new reviews for {}", key);
        }

        let sends = new_reviews.iter().map(|review| async move {
            self.notifier
                .post(&message::review_message(review, app))
                .await
        });

        let mut delivered = 0;
        let mut send_failures = 0;
        for result in join_all(sends).await {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Failed to deliver review notification for {}: {}", key, e);
                    send_failures += 1;
                }
            }
        }

        Ok(StreamDisposition::Known {
            new: new_reviews.len(),
            already_seen,
            delivered,
            send_failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(locale: &str, disposition: StreamDisposition) -> StreamReport {
        StreamReport {
            locale: locale.to_string(),
            disposition,
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            apps: vec![
                AppReport {
                    app_id: "a".to_string(),
                    store: StoreKind::AppStore,
                    streams: vec![
                        stream("us", StreamDisposition::FirstSeen { recorded: 3 }),
                        stream(
                            "gb",
                            StreamDisposition::Known {
                                new: 2,
                                already_seen: 5,
                                delivered: 2,
                                send_failures: 0,
                            },
                        ),
                    ],
                    outcome: AppOutcome::Completed,
                },
                AppReport {
                    app_id: "b".to_string(),
                    store: StoreKind::GooglePlay,
                    streams: vec![stream(
                        "en",
                        StreamDisposition::Known {
                            new: 1,
                            already_seen: 0,
                            delivered: 0,
                            send_failures: 1,
                        },
                    )],
                    outcome: AppOutcome::FetchFailed {
                        locale: "fr".to_string(),
                        error: "boom".to_string(),
                    },
                },
            ],
        };

        assert_eq!(summary.completed_apps(), 1);
        assert_eq!(summary.failed_apps(), 1);
        assert_eq!(summary.delivered(), 2);
        assert_eq!(summary.first_seen_streams(), 1);
    }
}
