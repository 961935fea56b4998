use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::clock::Delay;
use crate::error::SendError;
use crate::messages::SEPARATOR;
use crate::models::{DisplayMessage, Scope};

/// Pause between a primary message and its translated follow-up
const FOLLOW_UP_PACING: Duration = Duration::from_secs(1);
/// Pause after each delivered review, to respect Slack-side rate limits
const MESSAGE_PACING: Duration = Duration::from_secs(2);

/// Acknowledgement returned by a sender. Carries a thread handle when the
/// destination supports threaded follow-ups (webhooks do not).
#[derive(Debug, Clone, Default)]
pub struct SendAck {
    pub thread_ts: Option<String>,
}

/// Capability that posts one formatted message to the destination channel.
///
/// Senders without threading support (the webhook sender) always return an
/// ack with no thread handle, and their follow-ups go out as plain messages.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, scope: &Scope, text: &str) -> Result<SendAck, SendError>;

    /// Post a translated follow-up, threaded under `parent` when supported
    async fn send_follow_up(
        &self,
        scope: &Scope,
        text: &str,
        parent: &SendAck,
    ) -> Result<(), SendError>;
}

/// Sender backed by a Slack incoming webhook
pub struct SlackWebhookSender {
    client: Client,
    webhook_url: String,
    username: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    username: &'a str,
    icon_emoji: String,
}

impl SlackWebhookSender {
    pub fn new(webhook_url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
            username: username.into(),
        }
    }

    async fn post(&self, scope: &Scope, text: &str) -> Result<(), SendError> {
        debug!(scope = %scope, "Posting to Slack");

        let payload = WebhookPayload {
            text,
            username: &self.username,
            icon_emoji: scope.kind.icon_emoji(),
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected(status.as_u16(), body));
        }

        Ok(())
    }
}

#[async_trait]
impl Sender for SlackWebhookSender {
    async fn send(&self, scope: &Scope, text: &str) -> Result<SendAck, SendError> {
        self.post(scope, text).await?;
        // Webhooks cannot thread; follow-ups go out as plain messages
        Ok(SendAck::default())
    }

    async fn send_follow_up(
        &self,
        scope: &Scope,
        text: &str,
        _parent: &SendAck,
    ) -> Result<(), SendError> {
        let decorated = format!("  {}\n{}", text, SEPARATOR);
        self.post(scope, &decorated).await
    }
}

/// Deliver a batch of formatted reviews, oldest first.
///
/// The input arrives in provider order (newest-first), so it is reversed
/// before sending to read chronologically in the channel. Send failures are
/// logged and the rest of the batch is still attempted. Returns how many
/// primary messages went out.
pub async fn deliver_batch<S, D>(
    messages: &[DisplayMessage],
    scope: &Scope,
    sender: &S,
    delay: &D,
) -> usize
where
    S: Sender + ?Sized,
    D: Delay + ?Sized,
{
    let mut delivered = 0;

    for message in messages.iter().rev() {
        info!(scope = %scope, "Message: {}", message.text);

        match sender.send(scope, &message.text).await {
            Ok(ack) => {
                delivered += 1;

                if let Some(translated) = &message.translated {
                    info!(scope = %scope, "Translated review: {}", translated);
                    delay.sleep(FOLLOW_UP_PACING).await;
                    if let Err(e) = sender.send_follow_up(scope, translated, &ack).await {
                        error!(scope = %scope, error = %e, "Failed to send translated follow-up");
                    }
                }
            }
            Err(e) => {
                error!(scope = %scope, error = %e, "Failed to send message, continuing batch");
            }
        }

        delay.sleep(MESSAGE_PACING).await;
    }

    delivered
}
