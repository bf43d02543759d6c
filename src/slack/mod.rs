//! All Slack-specific functionality

pub mod client;
pub mod message_formatter;

// Re-export main types for convenience
pub use client::SlackClient;
pub use message_formatter::format_digest;
