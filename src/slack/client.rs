//! Slack API client module
//!
//! Implements the `ChatApi` port. Read-only lookups are retried with
//! jittered backoff; writes are sent once so a reply is never duplicated.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{
    SlackApiChatPostEphemeralRequest, SlackApiReactionsAddRequest, SlackApiReactionsRemoveRequest,
};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent, SlackReactionName,
    SlackTs, SlackUserId,
};
use std::time::Duration;
use tokio_retry::strategy::jitter;
use tokio_retry::{Retry, strategy::ExponentialBackoff};
use tracing::{debug, warn};

use crate::core::config::DEFAULT_SLACK_API_BASE;
use crate::core::models::{BotIdentity, ChatMessage, MessageRef};
use crate::core::ports::{ChatApi, PostMessage};
use crate::errors::AppError;

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface an AppError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

/// Slack API client with retry logic and error handling
pub struct SlackClient {
    token: SlackApiToken,
    api_base: String,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, DEFAULT_SLACK_API_BASE)
    }

    #[must_use]
    pub fn with_api_base(token: String, api_base: &str) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, AppError>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(100).map(jitter).take(3);

        Retry::spawn(strategy, operation).await
    }

    fn session_client(&self) -> Result<&'static SlackHyperClient, AppError> {
        SLACK_CLIENT.as_ref().ok_or_else(|| {
            AppError::GeneralError("Slack HTTP connector not initialized".to_string())
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }

    async fn get_method(&self, method: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let resp = HTTP_CLIENT
            .get(self.method_url(method))
            .bearer_auth(&self.token.token_value.0)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::HttpError(format!("{method} HTTP: {e}")))?;

        Self::read_ok_body(method, resp).await
    }

    async fn post_method(&self, method: &str, payload: &Value) -> Result<Value, AppError> {
        let resp = HTTP_CLIENT
            .post(self.method_url(method))
            .bearer_auth(&self.token.token_value.0)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::HttpError(format!("{method} HTTP: {e}")))?;

        Self::read_ok_body(method, resp).await
    }

    async fn read_ok_body(method: &str, resp: reqwest::Response) -> Result<Value, AppError> {
        if !resp.status().is_success() {
            return Err(AppError::ApiError(format!(
                "{method} HTTP {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AppError::ApiError(format!("{method} JSON parse error: {e}")))?;

        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            return Err(AppError::ApiError(format!(
                "{method} error: {}",
                body.get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
            )));
        }

        Ok(body)
    }

    fn messages_from(method: &str, body: Value) -> Result<Vec<ChatMessage>, AppError> {
        let parsed: MessagesResponse = serde_json::from_value(body)
            .map_err(|e| AppError::ApiError(format!("{method} messages parse: {e}")))?;
        Ok(parsed.messages)
    }
}

#[async_trait]
impl ChatApi for SlackClient {
    /// Post a message with optional Block Kit `blocks`, optionally as a thread reply.
    async fn post_message(&self, message: &PostMessage) -> Result<(), AppError> {
        let mut payload = json!({
            "channel": message.channel,
            "text": message.text,
            "unfurl_links": false,
        });

        if let Some(blocks) = &message.blocks {
            payload["blocks"] = blocks.clone();
        }

        if let Some(thread_ts) = &message.thread_ts {
            payload["thread_ts"] = Value::String(thread_ts.clone());
        }

        self.post_method("chat.postMessage", &payload).await?;
        Ok(())
    }

    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        text: &str,
    ) -> Result<(), AppError> {
        let session = self.session_client()?.open_session(&self.token);
        let req = SlackApiChatPostEphemeralRequest::new(
            SlackChannelId(channel.to_string()),
            SlackUserId(user.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        );

        session.chat_post_ephemeral(&req).await?;
        Ok(())
    }

    async fn history_at(&self, target: &MessageRef) -> Result<Vec<ChatMessage>, AppError> {
        self.with_retry(|| async {
            let body = self
                .get_method(
                    "conversations.history",
                    &[
                        ("channel", target.channel.as_str()),
                        ("oldest", target.ts.as_str()),
                        ("latest", target.ts.as_str()),
                        ("inclusive", "true"),
                        ("limit", "1"),
                    ],
                )
                .await?;
            let messages = Self::messages_from("conversations.history", body)?;
            debug!(count = messages.len(), "conversations.history lookup");
            Ok(messages)
        })
        .await
    }

    async fn thread_replies(&self, target: &MessageRef) -> Result<Vec<ChatMessage>, AppError> {
        self.with_retry(|| async {
            let body = self
                .get_method(
                    "conversations.replies",
                    &[
                        ("channel", target.channel.as_str()),
                        ("ts", target.ts.as_str()),
                    ],
                )
                .await?;
            Self::messages_from("conversations.replies", body)
        })
        .await
    }

    async fn add_reaction(&self, target: &MessageRef, name: &str) -> Result<(), AppError> {
        let session = self.session_client()?.open_session(&self.token);
        session
            .reactions_add(&SlackApiReactionsAddRequest {
                channel: SlackChannelId(target.channel.clone()),
                name: SlackReactionName(name.to_string()),
                timestamp: SlackTs(target.ts.clone()),
            })
            .await?;
        Ok(())
    }

    async fn bot_identity(&self) -> Result<BotIdentity, AppError> {
        let body = self
            .with_retry(|| async { self.get_method("auth.test", &[]).await })
            .await?;
        let identity: BotIdentity = serde_json::from_value(body)
            .map_err(|e| AppError::ApiError(format!("auth.test parse: {e}")))?;
        debug!(user_id = ?identity.user_id, bot_id = ?identity.bot_id, "Resolved bot identity");
        Ok(identity)
    }

    async fn remove_reaction(&self, target: &MessageRef, name: &str) -> Result<(), AppError> {
        let session = self.session_client()?.open_session(&self.token);
        session
            .reactions_remove(&SlackApiReactionsRemoveRequest {
                channel: Some(SlackChannelId(target.channel.clone())),
                name: SlackReactionName(name.to_string()),
                timestamp: Some(SlackTs(target.ts.clone())),
                file: None,
                full: None,
            })
            .await?;
        Ok(())
    }
}
