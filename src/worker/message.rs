use tracing::{debug, info};

use super::{NO_URL_WARNING, Workflow};
use crate::core::models::{MessageEvent, Outcome};
use crate::core::ports::PostMessage;
use crate::errors::AppError;
use crate::utils::links::first_url;

impl Workflow {
    pub(super) async fn on_message(
        &self,
        event: &MessageEvent,
        is_mention: bool,
    ) -> Result<Outcome, AppError> {
        if !event.has_handled_subtype() {
            debug!(subtype = ?event.subtype, "Skipping message subtype");
            return Ok(Outcome::Ignored);
        }

        let text = event.text.as_deref().unwrap_or("");
        if !is_mention
            && let Some(keyword) = self.settings.message_keyword.as_deref()
            && !text.contains(keyword)
        {
            return Ok(Outcome::Ignored);
        }

        if event.is_from(self.own_identity().await?) {
            debug!(channel = %event.channel, "Skipping own message");
            return Ok(Outcome::Ignored);
        }

        let Some(url) = first_url(text) else {
            info!(channel = %event.channel, "No URL in message");
            self.chat
                .post_message(&PostMessage::text(&event.channel, NO_URL_WARNING))
                .await?;
            return Ok(Outcome::NoUrl);
        };

        info!(url = %url, channel = %event.channel, mention = is_mention, "Summarizing link");
        let digest = self.build_digest(&url).await?;

        self.chat
            .post_message(&PostMessage::text(&event.channel, &digest.text).with_blocks(digest.blocks))
            .await?;
        Ok(Outcome::Replied)
    }
}
