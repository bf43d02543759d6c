use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::ChatMessage;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<>]+").expect("static regex compile"));

static SLACK_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[|<>]").expect("static regex compile"));

/// Every `http(s)://` token in `text`, left to right.
///
/// A token runs until the first whitespace or angle bracket, so Slack's
/// `<https://example.com>` markup yields the bare URL.
#[must_use]
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[must_use]
pub fn first_url(text: &str) -> Option<String> {
    URL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Text to scan for a link in a looked-up message.
///
/// When the message carries an attachment (a link unfurl), its title and
/// `title_link` are appended to the message text. Slack's `|`, `<` and `>`
/// link markup is blanked out in either case.
#[must_use]
pub fn message_link_text(message: &ChatMessage) -> String {
    let text = message.text.as_deref().unwrap_or("");
    let combined = match message.attachments.first() {
        Some(att) => format!(
            "{} {} {}",
            text,
            att.title.as_deref().unwrap_or(""),
            att.title_link.as_deref().unwrap_or("")
        ),
        None => text.to_string(),
    };
    SLACK_ESCAPE_RE.replace_all(&combined, " ").into_owned()
}
