use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::TranslateError;

/// Translation capability. Callers are responsible for pacing requests.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str) -> Result<String, TranslateError>;
}

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Client for the unofficial Google web translation endpoint
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
    target_lang: String,
}

impl GoogleTranslator {
    pub fn new(target_lang: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            target_lang: target_lang.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source_lang: &str) -> Result<String, TranslateError> {
        debug!(source_lang, "Requesting translation");

        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() >= 500 {
            return Err(TranslateError::Upstream(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Malformed(e.to_string()))?;

        // The endpoint answers with nested arrays; the translated segments
        // live at [0][i][0].
        let segments = body
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| TranslateError::Malformed("missing segment array".to_string()))?;

        let mut translated = String::new();
        for segment in segments {
            if let Some(piece) = segment.get(0).and_then(|v| v.as_str()) {
                translated.push(' ');
                translated.push_str(piece.trim_end_matches(' '));
            }
        }

        info!(translated = %translated, "Translated string");

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_translate_joins_segments() {
        let server = MockServer::start().await;

        let body = serde_json::json!([
            [
                ["Hello ", "Bonjour ", null],
                ["world", "le monde", null]
            ],
            null
        ]);

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "fr"))
            .and(query_param("tl", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new("en").with_base_url(server.uri());
        let result = translator.translate("Bonjour le monde", "fr").await.unwrap();

        assert_eq!(result, " Hello world");
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new("en").with_base_url(server.uri());
        let err = translator.translate("hola", "es").await.unwrap_err();

        assert!(matches!(err, TranslateError::Upstream(503)));
    }

    #[tokio::test]
    async fn test_garbled_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new("en").with_base_url(server.uri());
        let err = translator.translate("hola", "es").await.unwrap_err();

        assert!(matches!(err, TranslateError::Malformed(_)));
    }
}
