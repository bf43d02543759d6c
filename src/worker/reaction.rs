//! Reaction-triggered digests.
//!
//! Locating → Processing → Done, or Locating → Failed. The processing
//! indicator only exists during Processing and is always released before
//! the run leaves that state.

use tracing::{debug, info};

use super::indicator::with_processing_indicator;
use super::{NO_URL_EPHEMERAL, Workflow};
use crate::core::models::{ChatMessage, MessageRef, Outcome, ReactionEvent};
use crate::core::ports::PostMessage;
use crate::errors::AppError;
use crate::utils::links::{first_url, message_link_text};

impl Workflow {
    pub(super) async fn on_reaction(&self, event: &ReactionEvent) -> Result<Outcome, AppError> {
        if event.reaction != self.settings.trigger_reaction {
            return Ok(Outcome::Ignored);
        }
        let Some(target) = event.target() else {
            debug!(kind = %event.item.kind, "Reaction is not on a message");
            return Ok(Outcome::Ignored);
        };

        let message = self.locate_message(&target).await?;
        let text = message_link_text(&message);
        debug!(text = %text, "Resolved reacted message text");

        let Some(url) = first_url(&text) else {
            info!(channel = %target.channel, ts = %target.ts, "No URL in reacted message");
            self.chat
                .post_ephemeral(&target.channel, &event.user, NO_URL_EPHEMERAL)
                .await?;
            return Ok(Outcome::NoUrl);
        };

        info!(url = %url, channel = %target.channel, ts = %target.ts, "Summarizing reacted link");
        let digest = with_processing_indicator(
            self.chat.as_ref(),
            &target,
            &self.settings.processing_reaction,
            self.build_digest(&url),
        )
        .await?;

        self.chat
            .post_message(
                &PostMessage::text(&target.channel, &digest.text)
                    .with_blocks(digest.blocks)
                    .in_thread(&target.ts),
            )
            .await?;
        Ok(Outcome::Replied)
    }

    /// The message at exactly `target.ts`, or, when it lives inside a thread,
    /// the first message of that thread.
    async fn locate_message(&self, target: &MessageRef) -> Result<ChatMessage, AppError> {
        let mut messages = self.chat.history_at(target).await?;
        if messages.is_empty() {
            debug!(ts = %target.ts, "Not in channel history, looking in thread");
            messages = self.chat.thread_replies(target).await?;
        }

        messages.into_iter().next().ok_or_else(|| {
            AppError::ApiError(format!(
                "no message found at {} in channel {}",
                target.ts, target.channel
            ))
        })
    }
}
