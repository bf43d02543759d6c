//! Block Kit layout for a posted article digest.

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::core::models::RichMessage;

pub const AI_DISCLAIMER: &str =
    ":placard: _The above was summarized by generative AI. Please check the original article for details._";

/// Escape the three characters Slack treats as control sequences in mrkdwn.
#[must_use]
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[must_use]
pub fn header_line(title: &str, url: &str, date: Option<NaiveDate>) -> String {
    let link = format!(":point_right: *<{url}|{}>*", escape_mrkdwn(title).replace('|', "¦"));
    match date {
        Some(d) => format!("{link} ({})", d.format("%Y-%m-%d")),
        None => link,
    }
}

/// Summary quote followed by the keywords as inline code tags.
#[must_use]
pub fn quote_block(summary: &str, keywords: &[String]) -> String {
    let mut quoted: Vec<String> = escape_mrkdwn(summary)
        .lines()
        .map(|line| format!("> {line}"))
        .collect();
    if quoted.is_empty() {
        quoted.push("> ".to_string());
    }

    let tags: Vec<String> = keywords
        .iter()
        .map(|k| k.replace('`', "'"))
        .filter(|k| !k.trim().is_empty())
        .map(|k| format!("`{k}`"))
        .collect();
    if !tags.is_empty() {
        quoted.push(format!(">{}", tags.join(" ")));
    }

    quoted.join("\n")
}

/// Build the digest reply: linked title, quoted summary with keyword tags,
/// and the generative-AI disclaimer.
#[must_use]
pub fn format_digest(
    title: &str,
    url: &str,
    summary: &str,
    date: Option<NaiveDate>,
    keywords: &[String],
) -> RichMessage {
    let blocks: Value = json!([
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": header_line(title, url, date) }
        },
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": quote_block(summary, keywords) }
        },
        {
            "type": "context",
            "elements": [{ "type": "mrkdwn", "text": AI_DISCLAIMER }]
        }
    ]);

    RichMessage {
        text: summary.to_string(),
        blocks,
    }
}
