use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::{ReviewRecord, Scope};

const DEFAULT_BASE_URL: &str = "https://androidpublisher.googleapis.com";
const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// Adapter for the Google Play Developer API reviews endpoint.
///
/// Issues a single page request (newest-first as delivered by the provider)
/// and maps the provider payload into normalized review records. Credential
/// acquisition happens outside; this adapter only receives an access token.
pub struct AndroidAdapter {
    client: Client,
    base_url: String,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewsListResponse {
    #[serde(default)]
    reviews: Vec<AndroidReview>,
}

/// One review as returned by the reviews.list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidReview {
    pub review_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub comments: Vec<AndroidComment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidComment {
    pub user_comment: Option<UserComment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserComment {
    #[serde(default)]
    pub text: String,
    pub last_modified: Option<ApiTimestamp>,
    #[serde(default)]
    pub star_rating: i64,
    pub reviewer_language: Option<String>,
    pub app_version_name: Option<String>,
}

/// The API encodes epoch seconds as a string; tolerate both shapes
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTimestamp {
    pub seconds: Option<SecondsValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SecondsValue {
    Int(i64),
    Str(String),
}

impl SecondsValue {
    fn as_i64(&self) -> Option<i64> {
        match self {
            SecondsValue::Int(n) => Some(*n),
            SecondsValue::Str(s) => s.parse().ok(),
        }
    }
}

impl AndroidAdapter {
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

    /// Fetch the most recent page of reviews for a package
    pub async fn fetch(
        &self,
        scope: &Scope,
        package: &str,
        token: &str,
    ) -> Result<Vec<AndroidReview>, FetchError> {
        let url = format!(
            "{}/androidpublisher/v3/applications/{}/reviews",
            self.base_url, package
        );

        debug!(scope = %scope, package, "Fetching Play Store reviews");

        let response = self
            .client
            .get(&url)
            .query(&[("maxResults", PAGE_SIZE.to_string())])
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        // A 401/403 error body would otherwise parse as an empty listing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status(status.as_u16(), body));
        }

        let payload: serde_json::Value = response.json().await?;

        if let Some(dir) = &self.output_dir {
            super::dump_artifact(dir, &scope.artifact_name(), &payload);
        }

        let parsed: ReviewsListResponse =
            serde_json::from_value(payload).map_err(|e| FetchError::Malformed(e.to_string()))?;

        info!(scope = %scope, count = parsed.reviews.len(), "Fetched Play Store reviews");

        Ok(parsed.reviews)
    }

    /// Map one provider review into the normalized record shape.
    /// Reviews with no user comment at all are dropped.
    pub fn normalize(review: &AndroidReview, now: DateTime<Utc>) -> Option<ReviewRecord> {
        let comment = review
            .comments
            .first()
            .and_then(|c| c.user_comment.as_ref())?;

        let author = if review.author_name.is_empty() {
            "Anonymous".to_string()
        } else {
            review.author_name.clone()
        };

        let date = comment
            .last_modified
            .as_ref()
            .and_then(|ts| ts.seconds.as_ref())
            .and_then(|s| s.as_i64())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or(now)
            .format("%B %-d, %Y")
            .to_string();

        Some(ReviewRecord {
            id: review.review_id.clone(),
            author,
            version: comment
                .app_version_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            date,
            star_rating: comment.star_rating,
            title: None,
            body: comment.text.clone(),
            permalink: review.review_id.clone(),
            language: comment.reviewer_language.clone(),
        })
    }
}

impl Default for AndroidAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreKind;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scope() -> Scope {
        Scope::new("myapp", "en_US", StoreKind::Android)
    }

    fn sample_payload() -> serde_json::Value {
        serde_json::json!({
            "reviews": [
                {
                    "reviewId": "gp:1",
                    "authorName": "Alice",
                    "comments": [{
                        "userComment": {
                            "text": "\tLove it",
                            "lastModified": { "seconds": "1767225600", "nanos": 0 },
                            "starRating": 5,
                            "reviewerLanguage": "en",
                            "appVersionName": "2.1"
                        }
                    }]
                },
                {
                    "reviewId": "gp:2",
                    "authorName": "",
                    "comments": [{
                        "userComment": {
                            "text": "\tMeh",
                            "starRating": 2,
                            "reviewerLanguage": "fr"
                        }
                    }]
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_parses_reviews() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/androidpublisher/v3/applications/com.example.app/reviews"))
            .and(query_param("maxResults", "100"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_payload()))
            .mount(&server)
            .await;

        let adapter = AndroidAdapter::new().with_base_url(server.uri());
        let reviews = adapter
            .fetch(&scope(), "com.example.app", "test-token")
            .await
            .unwrap();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].review_id, "gp:1");
    }

    #[tokio::test]
    async fn test_fetch_empty_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/androidpublisher/v3/applications/com.example.app/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let adapter = AndroidAdapter::new().with_base_url(server.uri());
        let reviews = adapter
            .fetch(&scope(), "com.example.app", "test-token")
            .await
            .unwrap();

        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_auth_error_is_not_empty_listing() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        });

        Mock::given(method("GET"))
            .and(path("/androidpublisher/v3/applications/com.example.app/reviews"))
            .respond_with(ResponseTemplate::new(403).set_body_json(error_body))
            .mount(&server)
            .await;

        let adapter = AndroidAdapter::new().with_base_url(server.uri());
        let err = adapter
            .fetch(&scope(), "com.example.app", "stale-token")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(403, _)));
    }

    #[tokio::test]
    async fn test_fetch_garbled_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/androidpublisher/v3/applications/com.example.app/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let adapter = AndroidAdapter::new().with_base_url(server.uri());
        let err = adapter
            .fetch(&scope(), "com.example.app", "test-token")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_normalize_full_review() {
        let payload = sample_payload();
        let reviews: Vec<AndroidReview> =
            serde_json::from_value(payload["reviews"].clone()).unwrap();

        let record = AndroidAdapter::normalize(&reviews[0], Utc::now()).unwrap();

        assert_eq!(record.id, "gp:1");
        assert_eq!(record.author, "Alice");
        assert_eq!(record.version, "2.1");
        assert_eq!(record.star_rating, 5);
        assert_eq!(record.language.as_deref(), Some("en"));
        assert_eq!(record.date, "January 1, 2026");
        assert!(record.title.is_none());
    }

    #[test]
    fn test_normalize_fallbacks() {
        let payload = sample_payload();
        let reviews: Vec<AndroidReview> =
            serde_json::from_value(payload["reviews"].clone()).unwrap();

        let now = Utc::now();
        let record = AndroidAdapter::normalize(&reviews[1], now).unwrap();

        assert_eq!(record.author, "Anonymous");
        assert_eq!(record.version, "Unknown");
        // No timestamp in payload, so the ingestion time is used
        assert_eq!(record.date, now.format("%B %-d, %Y").to_string());
    }

    #[test]
    fn test_normalize_skips_review_without_comment() {
        let review = AndroidReview {
            review_id: "gp:3".to_string(),
            author_name: "Bob".to_string(),
            comments: vec![],
        };

        assert!(AndroidAdapter::normalize(&review, Utc::now()).is_none());
    }
}
