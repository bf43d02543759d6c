use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outer Events API envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    UrlVerification { challenge: String },
    EventCallback { event: Value },
    #[serde(other)]
    Other,
}

/// An event delivered by the chat platform. Read-only once parsed.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Message(MessageEvent),
    #[serde(rename = "app_mention")]
    Mention(MessageEvent),
    ReactionAdded(ReactionEvent),
    #[serde(other)]
    Unsupported,
}

impl InboundEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Message(_) => "message",
            InboundEvent::Mention(_) => "app_mention",
            InboundEvent::ReactionAdded(_) => "reaction_added",
            InboundEvent::Unsupported => "unsupported",
        }
    }

    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        match self {
            InboundEvent::Message(m) | InboundEvent::Mention(m) => Some(&m.channel),
            InboundEvent::ReactionAdded(r) => r.item.channel.as_deref(),
            InboundEvent::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub text: Option<String>,
    pub channel: String,
    pub ts: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Message subtypes that can carry a shared link. Edits, deletions, joins
/// and other system subtypes are never handled.
pub const HANDLED_SUBTYPES: &[&str] = &["bot_message", "file_share", "thread_broadcast"];

impl MessageEvent {
    #[must_use]
    pub fn has_handled_subtype(&self) -> bool {
        self.subtype
            .as_deref()
            .is_none_or(|subtype| HANDLED_SUBTYPES.contains(&subtype))
    }

    /// Whether this bot posted the message itself.
    #[must_use]
    pub fn is_from(&self, me: &BotIdentity) -> bool {
        let same_bot = me.bot_id.is_some() && self.bot_id == me.bot_id;
        let same_user = me.user_id.is_some() && self.user == me.user_id;
        same_bot || same_user
    }
}

/// Who the bot token belongs to, as reported by `auth.test`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BotIdentity {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactionEvent {
    pub reaction: String,
    pub user: String,
    pub item: ReactionItem,
    #[serde(default)]
    pub event_ts: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactionItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl ReactionEvent {
    /// The reacted-to message, if the reaction targets a message at all.
    #[must_use]
    pub fn target(&self) -> Option<MessageRef> {
        if self.item.kind != "message" {
            return None;
        }
        Some(MessageRef {
            channel: self.item.channel.clone()?,
            ts: self.item.ts.clone()?,
        })
    }
}

/// Channel + timestamp pair identifying a single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

/// A message as returned by history or thread lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArticle {
    pub canonical_url: String,
    pub title: String,
    pub body_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub keywords: Vec<String>,
    #[serde(rename = "tweet")]
    pub tweet_text: String,
}

/// A Block Kit message ready to post, with a plain-text fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct RichMessage {
    pub text: String,
    pub blocks: Value,
}

/// How a workflow run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A digest was posted.
    Replied,
    /// No link was found; the user was told so.
    NoUrl,
    /// The event does not concern this bot.
    Ignored,
}
