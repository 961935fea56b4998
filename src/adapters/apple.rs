use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::{ReviewRecord, Scope};

const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";
const USER_AGENT: &str = "iTunes/12.8 (Macintosh; U; Mac OS X 10.14)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// Adapter for the iTunes customer-reviews RSS feed.
///
/// The feed is locale-scoped through the `X-Apple-Store-Front` header, so no
/// language filtering happens downstream. When the feed holds exactly one
/// review its `entry` field is a bare object rather than a list; both shapes
/// normalize into the same ordered sequence.
pub struct AppleAdapter {
    client: Client,
    base_url: String,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    feed: FeedBody,
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    entry: Option<Entries>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entries {
    One(Box<AppleEntry>),
    Many(Vec<AppleEntry>),
}

/// One review entry from the RSS feed
#[derive(Debug, Clone, Deserialize)]
pub struct AppleEntry {
    pub id: Label,
    pub author: AppleAuthor,
    pub title: Label,
    pub content: Label,
    #[serde(rename = "im:version")]
    pub version: Option<Label>,
    #[serde(rename = "im:rating")]
    pub rating: Option<Label>,
    pub link: AppleLink,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppleAuthor {
    pub name: Label,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppleLink {
    pub attributes: LinkAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkAttributes {
    pub href: String,
}

impl AppleAdapter {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    /// Fetch the most-recent reviews for an app in one storefront.
    ///
    /// A feed without an `entry` collection is a successful fetch with zero
    /// items; an unparseable body is `FetchError::Malformed`. Callers treat
    /// both as "no new reviews" but the distinction stays observable.
    pub async fn fetch(
        &self,
        scope: &Scope,
        app_id: &str,
        store_front_id: u32,
    ) -> Result<Vec<AppleEntry>, FetchError> {
        let url = format!(
            "{}/rss/customerreviews/id={}/sortBy=mostRecent/json",
            self.base_url, app_id
        );

        debug!(scope = %scope, app_id, store_front_id, "Fetching Apple reviews");

        let response = self
            .client
            .get(&url)
            .header("X-Apple-Store-Front", store_front_id.to_string())
            .header("User-Agent", USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status(status.as_u16(), body));
        }

        let payload: serde_json::Value = response.json().await?;

        if let Some(dir) = &self.output_dir {
            super::dump_artifact(dir, &scope.artifact_name(), &payload);
        }

        let document: FeedDocument =
            serde_json::from_value(payload).map_err(|e| FetchError::Malformed(e.to_string()))?;

        let entries = match document.feed.entry {
            None => Vec::new(),
            Some(Entries::One(entry)) => vec![*entry],
            Some(Entries::Many(entries)) => entries,
        };

        info!(scope = %scope, count = entries.len(), "Fetched Apple reviews");

        Ok(entries)
    }

    /// Map one feed entry into the normalized record shape.
    ///
    /// The feed carries no usable timestamp, so the record's date is the
    /// ingestion time. Reviews therefore always display as posted "today".
    pub fn normalize(entry: &AppleEntry, now: DateTime<Utc>) -> ReviewRecord {
        ReviewRecord {
            id: entry.id.label.clone(),
            author: entry.author.name.label.clone(),
            version: entry
                .version
                .as_ref()
                .map(|v| v.label.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            date: now.format("%B %-d, %Y").to_string(),
            star_rating: entry
                .rating
                .as_ref()
                .and_then(|r| r.label.parse().ok())
                .unwrap_or(0),
            title: Some(entry.title.label.clone()),
            body: entry.content.label.clone(),
            permalink: entry.link.attributes.href.clone(),
            language: None,
        }
    }
}

impl Default for AppleAdapter {
    fn default() -> Self {
        Self::new()
    }
}
