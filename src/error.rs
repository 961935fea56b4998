use thiserror::Error;

/// Errors raised while fetching reviews from a provider. All variants are
/// recoverable: the affected scope is skipped and the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("provider returned HTTP {0}: {1}")]
    Status(u16, String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}

/// Errors from the translation endpoint. Recoverable per record: the message
/// is still delivered with a placeholder in place of the translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Kept for the error contract and its placeholder wording; Rust strings
    /// are always valid UTF-8, so no current code path constructs this.
    #[error("text could not be encoded for the translation endpoint")]
    Encoding,
    #[error("translation endpoint returned HTTP {0}")]
    Upstream(u16),
    #[error("unexpected translation response: {0}")]
    Malformed(String),
    #[error("translation request failed: {0}")]
    Transport(String),
}

impl TranslateError {
    /// Fallback text posted when a translation cannot be produced
    pub fn placeholder(&self, source_lang: &str) -> String {
        match self {
            TranslateError::Encoding => format!(
                "Encoding error translating. Sorry about that. Beginning language was: {}",
                source_lang
            ),
            _ => format!(
                "HTTP error translating. Sorry about that. Beginning language was: {}",
                source_lang
            ),
        }
    }
}

/// Errors from the Slack boundary. Recoverable per message: logged, then the
/// rest of the batch is still attempted.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("slack returned HTTP {0}: {1}")]
    Rejected(u16, String),
    #[error("slack request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        SendError::Transport(err.to_string())
    }
}
