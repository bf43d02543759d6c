//! Seams between the workflow and its external collaborators.
//!
//! Production code wires in `SlackClient`, `ArticleResolver` and
//! `VertexClient`; tests swap in recording fakes.

use async_trait::async_trait;
use serde_json::Value;

use super::models::{
    BotIdentity, ChatMessage, InboundEvent, MessageRef, Outcome, ResolvedArticle, SummaryResult,
};
use crate::errors::AppError;

/// A `chat.postMessage` request.
#[derive(Debug, Clone, PartialEq)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
    pub blocks: Option<Value>,
    pub thread_ts: Option<String>,
}

impl PostMessage {
    #[must_use]
    pub fn text(channel: &str, text: &str) -> Self {
        Self {
            channel: channel.to_string(),
            text: text.to_string(),
            blocks: None,
            thread_ts: None,
        }
    }

    #[must_use]
    pub fn with_blocks(mut self, blocks: Value) -> Self {
        self.blocks = Some(blocks);
        self
    }

    #[must_use]
    pub fn in_thread(mut self, thread_ts: &str) -> Self {
        self.thread_ts = Some(thread_ts.to_string());
        self
    }
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn post_message(&self, message: &PostMessage) -> Result<(), AppError>;

    async fn post_ephemeral(&self, channel: &str, user: &str, text: &str)
    -> Result<(), AppError>;

    /// Messages whose timestamp is exactly `target.ts` in the channel's top-level history.
    async fn history_at(&self, target: &MessageRef) -> Result<Vec<ChatMessage>, AppError>;

    /// The thread rooted at (or containing) `target.ts`, parent first.
    async fn thread_replies(&self, target: &MessageRef) -> Result<Vec<ChatMessage>, AppError>;

    async fn add_reaction(&self, target: &MessageRef, name: &str) -> Result<(), AppError>;

    async fn remove_reaction(&self, target: &MessageRef, name: &str) -> Result<(), AppError>;

    /// The bot's own user and bot ids.
    async fn bot_identity(&self) -> Result<BotIdentity, AppError>;
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<ResolvedArticle, AppError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, body_text: &str) -> Result<SummaryResult, AppError>;
}

/// Runs the business workflow for one inbound event.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, event: &InboundEvent) -> Result<Outcome, AppError>;
}
