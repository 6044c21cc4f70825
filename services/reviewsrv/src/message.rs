//! Slack message construction
//!
//! Builds the webhook payloads: one attachment per new review, and a
//! plain-text announcement when a stream is watched for the first time.
//! Field names follow the Slack incoming-webhook attachment schema.

use serde::Serialize;

use crate::review::{Review, TrackedApp};

/// Slack webhook payload
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// One Slack attachment
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub mrkdwn_in: Vec<String>,
    pub fallback: String,
    pub pretext: String,
    pub color: String,
    pub author_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,

    pub text: String,
}

/// Render a score as five star glyphs
pub fn render_stars(score: u8) -> String {
    let mut stars = String::with_capacity(15);
    for i in 0..5 {
        stars.push(if i < score { '★' } else { '☆' });
    }
    stars
}

/// Attachment color bar for a score
pub fn score_color(score: u8) -> &'static str {
    if score >= 4 {
        "good"
    } else if score >= 2 {
        "warning"
    } else {
        "danger"
    }
}

/// Build the notification for one new review
pub fn review_message(review: &Review, app: &TrackedApp) -> SlackMessage {
    let stars = render_stars(review.score);
    let store_name = app.store.display_name();

    let mut pretext = String::from("New review");
    if let Some(name) = &app.name {
        pretext.push_str(" for ");
        pretext.push_str(name);
    }
    pretext.push('!');

    let mut text = review.text.clone();
    text.push('\n');
    text.push_str("_by ");
    text.push_str(&review.author);
    if let Some(date) = &review.date {
        text.push_str(", ");
        text.push_str(date);
    }
    match &review.url {
        Some(url) => text.push_str(&format!(" - <{}|{}>", url, store_name)),
        None => text.push_str(&format!(" - {}", store_name)),
    }
    text.push('_');

    let fallback = match &review.title {
        Some(title) => format!("{}: {} ({}): {}", pretext, title, stars, review.text),
        None => format!("{}: ({}): {}", pretext, stars, review.text),
    };

    SlackMessage {
        text: None,
        attachments: Some(vec![Attachment {
            mrkdwn_in: vec![
                "text".to_string(),
                "pretext".to_string(),
                "title".to_string(),
            ],
            fallback,
            pretext,
            color: score_color(review.score).to_string(),
            author_name: stars,
            title: review.title.clone(),
            title_link: review.url.clone(),
            text,
        }]),
    }
}

/// Build the one-time announcement for a newly watched stream
pub fn watch_message(app: &TrackedApp) -> SlackMessage {
    SlackMessage {
        text: Some(format!(
            "Now watching for reviews of {} on the {} (`{}`)",
            app.label(),
            app.store.display_name(),
            app.app_id
        )),
        attachments: None,
    }
}
