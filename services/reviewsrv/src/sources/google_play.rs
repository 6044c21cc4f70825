//! Google Play review feed client
//!
//! Google Play has no public review feed, so this client speaks the
//! `batchexecute` RPC the store web UI uses. The request wraps a
//! JSON-encoded argument string in an `f.req` form field; the response
//! starts with an anti-JSON guard line, and the actual review list is a
//! JSON string nested inside the outer envelope.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::ReviewSource;
use crate::error::{Result, ReviewSrvError};
use crate::review::{Review, StoreKind};

const PLAY_BASE_URL: &str = "https://play.google.com";
const BATCHEXECUTE_PATH: &str = "/_/PlayStoreUi/data/batchexecute";
const REVIEWS_RPC_ID: &str = "UsvDTd";
const SORT_NEWEST: u8 = 2;
const PAGE_SIZE: u32 = 100;

/// Google Play review source
pub struct GooglePlaySource {
    client: Client,
    base_url: String,
}

impl GooglePlaySource {
    /// Create a source using the public Play endpoint
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, PLAY_BASE_URL)
    }

    /// Create a source against a custom endpoint (used by tests)
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ReviewSource for GooglePlaySource {
    fn store(&self) -> StoreKind {
        StoreKind::GooglePlay
    }

    async fn list_reviews(&self, app_id: &str, locale: &str) -> Result<Vec<Review>> {
        let url = format!("{}{}", self.base_url, BATCHEXECUTE_PATH);

        let response = self
            .client
            .post(&url)
            .query(&[("hl", locale)])
            .form(&[("f.req", reviews_request_body(app_id))])
            .send()
            .await
            .map_err(|e| ReviewSrvError::fetch(format!("Google Play request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ReviewSrvError::fetch(format!(
                "Google Play returned status {} for {}",
                response.status(),
                app_id
            )));
        }

        let body = response.text().await.map_err(|e| {
            ReviewSrvError::fetch(format!("Failed to read Google Play response: {}", e))
        })?;

        parse_batchexecute(app_id, &body)
    }
}

/// Build the `f.req` envelope for the newest-first reviews RPC
fn reviews_request_body(app_id: &str) -> String {
    let request = serde_json::json!([
        null,
        null,
        [2, SORT_NEWEST, [PAGE_SIZE, null, null], null, []],
        [app_id, 7]
    ]);

    serde_json::json!([[[REVIEWS_RPC_ID, request.to_string(), null, "generic"]]]).to_string()
}

/// Decode a batchexecute response into reviews
pub fn parse_batchexecute(app_id: &str, body: &str) -> Result<Vec<Review>> {
    // Skip the ")]}'" guard line before the envelope
    let start = body.find('[').ok_or_else(|| {
        ReviewSrvError::fetch("Google Play response contains no JSON envelope".to_string())
    })?;

    let outer: Value = serde_json::from_str(&body[start..]).map_err(|e| {
        ReviewSrvError::fetch(format!("Failed to decode Google Play envelope: {}", e))
    })?;

    let payload = match outer.get(0).and_then(|chunk| chunk.get(2)) {
        Some(Value::String(payload)) => payload,
        Some(Value::Null) => return Ok(Vec::new()),
        _ => {
            return Err(ReviewSrvError::fetch(
                "Google Play envelope missing reviews payload".to_string(),
            ))
        }
    };

    let inner: Value = serde_json::from_str(payload).map_err(|e| {
        ReviewSrvError::fetch(format!("Failed to decode Google Play payload: {}", e))
    })?;

    let items = match inner.get(0).and_then(Value::as_array) {
        Some(items) => items,
        None => return Ok(Vec::new()),
    };

    let mut reviews = Vec::new();
    for item in items {
        match parse_review_item(app_id, item) {
            Some(review) => reviews.push(review),
            None => debug!(app_id, "Skipping malformed Google Play review item"),
        }
    }

    Ok(reviews)
}

/// Extract one review from its positional array form
fn parse_review_item(app_id: &str, item: &Value) -> Option<Review> {
    let id = item.get(0)?.as_str()?.to_string();
    let author = item.get(1)?.get(0)?.as_str()?.to_string();
    let score = item.get(2)?.as_u64()? as u8;
    let text = item.get(4)?.as_str()?.to_string();

    let date = item
        .get(5)
        .and_then(|stamp| stamp.get(0))
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string());

    let url = format!(
        "{}/store/apps/details?id={}&reviewId={}",
        PLAY_BASE_URL, app_id, id
    );

    Some(Review {
        id,
        score,
        title: None,
        text,
        author,
        url: Some(url),
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn review_item(id: &str, score: u8, text: &str, epoch: i64) -> Value {
        serde_json::json!([id, ["Sam", [null, 2]], score, null, text, [epoch, 0], 17])
    }

    fn batch_body(items: Value) -> String {
        let payload = serde_json::json!([items, [null, "next-page-token"]]).to_string();
        let outer = serde_json::json!([
            ["wrb.fr", REVIEWS_RPC_ID, payload, null, null, null, "generic"],
            ["di", 59],
        ]);
        format!(")]}}'\n\n{}", outer)
    }

    #[test]
    fn test_request_body_wraps_rpc_envelope() {
        let body = reviews_request_body("com.example.app");
        assert!(body.contains(REVIEWS_RPC_ID));
        assert!(body.contains("com.example.app"));

        // The envelope itself must be valid JSON
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed[0][0][0], REVIEWS_RPC_ID);
    }

    #[test]
    fn test_parse_reviews_from_envelope() {
        let body = batch_body(serde_json::json!([
            review_item("gp:r1", 5, "Nice app", 1709251200),
            review_item("gp:r2", 1, "Broken", 1709337600),
        ]));

        let reviews = parse_batchexecute("com.example.app", &body).unwrap();
        assert_eq!(reviews.len(), 2);

        let first = &reviews[0];
        assert_eq!(first.id, "gp:r1");
        assert_eq!(first.score, 5);
        assert_eq!(first.title, None);
        assert_eq!(first.text, "Nice app");
        assert_eq!(first.author, "Sam");
        assert_eq!(first.date.as_deref(), Some("2024-03-01"));
        assert_eq!(
            first.url.as_deref(),
            Some("https://play.google.com/store/apps/details?id=com.example.app&reviewId=gp:r1")
        );

        assert_eq!(reviews[1].date.as_deref(), Some("2024-03-02"));
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let body = batch_body(serde_json::json!([
            review_item("gp:r1", 4, "Fine", 1709251200),
            ["gp:r2", ["Sam", null], 3],
        ]));

        let reviews = parse_batchexecute("com.example.app", &body).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, "gp:r1");
    }

    #[test]
    fn test_missing_timestamp_leaves_date_empty() {
        let body = batch_body(serde_json::json!([[
            "gp:r1",
            ["Sam", null],
            3,
            null,
            "Okay",
            null,
        ]]));

        let reviews = parse_batchexecute("com.example.app", &body).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].date, None);
    }

    #[test]
    fn test_empty_review_list() {
        let body = batch_body(Value::Null);
        let reviews = parse_batchexecute("com.example.app", &body).unwrap();
        assert!(reviews.is_empty());
    }

    #[test]
    fn test_null_payload_means_no_reviews() {
        let outer = serde_json::json!([["wrb.fr", REVIEWS_RPC_ID, null]]);
        let body = format!(")]}}'\n\n{}", outer);

        let reviews = parse_batchexecute("com.example.app", &body).unwrap();
        assert!(reviews.is_empty());
    }

    #[test]
    fn test_garbage_body_is_a_fetch_error() {
        assert!(matches!(
            parse_batchexecute("com.example.app", "no json here"),
            Err(ReviewSrvError::FetchError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_reviews_posts_rpc_form() {
        let server = MockServer::start().await;
        let body = batch_body(serde_json::json!([review_item(
            "gp:r1", 5, "Nice app", 1709251200
        )]));
        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .and(query_param("hl", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let source = GooglePlaySource::with_base_url(Client::new(), server.uri());
        let reviews = source.list_reviews("com.example.app", "en").await.unwrap();

        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, "gp:r1");

        let requests = server.received_requests().await.unwrap();
        let sent = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(sent.starts_with("f.req="));
        assert!(sent.contains(REVIEWS_RPC_ID));
    }

    #[tokio::test]
    async fn test_list_reviews_propagates_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let source = GooglePlaySource::with_base_url(Client::new(), server.uri());
        let result = source.list_reviews("com.example.app", "en").await;

        assert!(matches!(result, Err(ReviewSrvError::FetchError(_))));
    }
}
