//! Recording fakes for the workflow ports.
//!
//! All fakes append to one shared journal so tests can assert on the order
//! of side effects across collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use linkdigest::AppError;
use linkdigest::core::models::{BotIdentity, ChatMessage, MessageRef, ResolvedArticle, SummaryResult};
use linkdigest::core::ports::{ArticleSource, ChatApi, PostMessage, Summarizer};
use linkdigest::worker::{Workflow, WorkflowSettings};

pub const TRIGGER: &str = "summary";
pub const PROCESSING: &str = "hourglass_flowing_sand";
pub const OWN_USER: &str = "UBOT";
pub const OWN_BOT: &str = "BSELF";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Post(PostMessage),
    Ephemeral { channel: String, user: String, text: String },
    History(MessageRef),
    Replies(MessageRef),
    AddReaction(String),
    RemoveReaction(String),
    Resolve(String),
    Summarize(String),
}

pub type Journal = Arc<Mutex<Vec<Call>>>;

pub struct FakeChat {
    pub journal: Journal,
    pub history: Vec<ChatMessage>,
    pub replies: Vec<ChatMessage>,
    pub add_fails: bool,
}

#[async_trait]
impl ChatApi for FakeChat {
    async fn post_message(&self, message: &PostMessage) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(Call::Post(message.clone()));
        Ok(())
    }

    async fn post_ephemeral(&self, channel: &str, user: &str, text: &str) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(Call::Ephemeral {
            channel: channel.to_string(),
            user: user.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn history_at(&self, target: &MessageRef) -> Result<Vec<ChatMessage>, AppError> {
        self.journal.lock().unwrap().push(Call::History(target.clone()));
        Ok(self.history.clone())
    }

    async fn thread_replies(&self, target: &MessageRef) -> Result<Vec<ChatMessage>, AppError> {
        self.journal.lock().unwrap().push(Call::Replies(target.clone()));
        Ok(self.replies.clone())
    }

    async fn add_reaction(&self, _target: &MessageRef, name: &str) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(Call::AddReaction(name.to_string()));
        if self.add_fails {
            return Err(AppError::ApiError("reactions.add error: already_reacted".to_string()));
        }
        Ok(())
    }

    async fn remove_reaction(&self, _target: &MessageRef, name: &str) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(Call::RemoveReaction(name.to_string()));
        Ok(())
    }

    async fn bot_identity(&self) -> Result<BotIdentity, AppError> {
        Ok(BotIdentity {
            user_id: Some(OWN_USER.to_string()),
            bot_id: Some(OWN_BOT.to_string()),
        })
    }
}

pub struct FakeArticles {
    pub journal: Journal,
    pub fail: bool,
}

#[async_trait]
impl ArticleSource for FakeArticles {
    async fn resolve(&self, url: &str) -> Result<ResolvedArticle, AppError> {
        self.journal.lock().unwrap().push(Call::Resolve(url.to_string()));
        if self.fail {
            return Err(AppError::FetchError(format!("GET {url} returned HTTP 404")));
        }
        Ok(ResolvedArticle {
            canonical_url: format!("{url}?canonical=1"),
            title: "Example Article".to_string(),
            body_text: "Article body".to_string(),
        })
    }
}

pub struct FakeSummarizer {
    pub journal: Journal,
    pub fail: bool,
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, body_text: &str) -> Result<SummaryResult, AppError> {
        self.journal.lock().unwrap().push(Call::Summarize(body_text.to_string()));
        if self.fail {
            return Err(AppError::InvalidSummary("missing field `keywords`".to_string()));
        }
        Ok(SummaryResult {
            summary: "A short summary".to_string(),
            keywords: vec!["Rust".to_string(), "Slack".to_string()],
            tweet_text: "Read this #Rust".to_string(),
        })
    }
}

/// Builder for a workflow wired to fakes.
#[derive(Default)]
pub struct Harness {
    pub history: Vec<ChatMessage>,
    pub replies: Vec<ChatMessage>,
    pub fetch_fails: bool,
    pub summary_fails: bool,
    pub add_fails: bool,
    pub message_keyword: Option<String>,
}

impl Harness {
    pub fn build(self) -> (Workflow, Journal) {
        let journal: Journal = Arc::default();
        let chat = FakeChat {
            journal: Arc::clone(&journal),
            history: self.history,
            replies: self.replies,
            add_fails: self.add_fails,
        };
        let articles = FakeArticles {
            journal: Arc::clone(&journal),
            fail: self.fetch_fails,
        };
        let summarizer = FakeSummarizer {
            journal: Arc::clone(&journal),
            fail: self.summary_fails,
        };
        let workflow = Workflow::new(
            Arc::new(chat),
            Arc::new(articles),
            Arc::new(summarizer),
            WorkflowSettings {
                trigger_reaction: TRIGGER.to_string(),
                processing_reaction: PROCESSING.to_string(),
                message_keyword: self.message_keyword,
            },
        );
        (workflow, journal)
    }
}

pub fn calls(journal: &Journal) -> Vec<Call> {
    journal.lock().unwrap().clone()
}

pub fn message(text: &str) -> ChatMessage {
    ChatMessage {
        text: Some(text.to_string()),
        ts: Some("1700000000.000100".to_string()),
        attachments: Vec::new(),
    }
}
