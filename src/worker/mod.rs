//! Per-event workflows: message, mention and reaction.

pub mod indicator;
mod message;
mod reaction;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::models::{BotIdentity, InboundEvent, Outcome, RichMessage};
use crate::core::ports::{ArticleSource, ChatApi, EventDispatcher, Summarizer};
use crate::errors::AppError;
use crate::slack::format_digest;

pub use indicator::{ProcessingIndicator, with_processing_indicator};

/// Posted in-channel when a message or mention has no link.
pub const NO_URL_WARNING: &str = "_⚠️ URL not found._";

/// Shown only to the reacting user when the reacted message has no link.
pub const NO_URL_EPHEMERAL: &str = "_⚠️ URL is not found_";

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Emoji that asks for a digest of the reacted message.
    pub trigger_reaction: String,
    /// Emoji shown on the message while the digest is built.
    pub processing_reaction: String,
    /// Plain messages are only handled when they contain this; `None` handles all.
    pub message_keyword: Option<String>,
}

impl WorkflowSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            trigger_reaction: config.slack_reaction_key.clone(),
            processing_reaction: config.slack_processing_reaction_key.clone(),
            message_keyword: config.message_keyword.clone(),
        }
    }
}

pub struct Workflow {
    chat: Arc<dyn ChatApi>,
    articles: Arc<dyn ArticleSource>,
    summarizer: Arc<dyn Summarizer>,
    settings: WorkflowSettings,
    identity: OnceCell<BotIdentity>,
}

impl Workflow {
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatApi>,
        articles: Arc<dyn ArticleSource>,
        summarizer: Arc<dyn Summarizer>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            chat,
            articles,
            summarizer,
            settings,
            identity: OnceCell::new(),
        }
    }

    /// Looked up on first use and kept for the life of the process.
    async fn own_identity(&self) -> Result<&BotIdentity, AppError> {
        self.identity
            .get_or_try_init(|| self.chat.bot_identity())
            .await
    }

    /// # Errors
    ///
    /// Returns the first failure of the event's workflow. Nothing is retried.
    pub async fn handle(&self, event: &InboundEvent) -> Result<Outcome, AppError> {
        match event {
            InboundEvent::Message(msg) => self.on_message(msg, false).await,
            InboundEvent::Mention(msg) => self.on_message(msg, true).await,
            InboundEvent::ReactionAdded(reaction) => self.on_reaction(reaction).await,
            InboundEvent::Unsupported => Ok(Outcome::Ignored),
        }
    }

    /// Resolve the page, summarize it and lay out the reply.
    async fn build_digest(&self, url: &str) -> Result<RichMessage, AppError> {
        let article = self.articles.resolve(url).await?;
        info!(url = %article.canonical_url, title = %article.title, "Resolved article");

        let summary = self.summarizer.summarize(&article.body_text).await?;
        debug!(tweet = %summary.tweet_text, keywords = ?summary.keywords, "Summary generated");

        Ok(format_digest(
            &article.title,
            &article.canonical_url,
            &summary.summary,
            None,
            &summary.keywords,
        ))
    }
}

#[async_trait]
impl EventDispatcher for Workflow {
    async fn dispatch(&self, event: &InboundEvent) -> Result<Outcome, AppError> {
        self.handle(event).await
    }
}
