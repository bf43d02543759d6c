//! The "processing" reaction shown on a message while its digest is built.

use std::future::Future;
use tracing::{debug, warn};

use crate::core::models::MessageRef;
use crate::core::ports::ChatApi;
use crate::errors::AppError;

/// A processing reaction attached to a message. Consumed by [`release`],
/// so it can be removed at most once.
///
/// [`release`]: ProcessingIndicator::release
#[must_use = "an attached indicator must be released"]
pub struct ProcessingIndicator<'a> {
    chat: &'a dyn ChatApi,
    target: &'a MessageRef,
    name: &'a str,
}

impl<'a> ProcessingIndicator<'a> {
    /// Add the reaction. A failed add is logged; the indicator is still
    /// returned so the matching removal is attempted.
    pub async fn attach(chat: &'a dyn ChatApi, target: &'a MessageRef, name: &'a str) -> Self {
        match chat.add_reaction(target, name).await {
            Ok(()) => debug!(reaction = %name, ts = %target.ts, "Processing indicator added"),
            Err(e) => warn!(reaction = %name, ts = %target.ts, "Failed to add processing indicator: {}", e),
        }
        Self { chat, target, name }
    }

    pub async fn release(self) {
        match self.chat.remove_reaction(self.target, self.name).await {
            Ok(()) => debug!(reaction = %self.name, ts = %self.target.ts, "Processing indicator removed"),
            Err(e) => warn!(
                reaction = %self.name,
                ts = %self.target.ts,
                "Failed to remove processing indicator: {}",
                e
            ),
        }
    }
}

/// Run `work` with the processing indicator attached to `target`.
///
/// The indicator is added before `work` starts and removed once it finishes,
/// whether it succeeded or failed.
///
/// # Errors
///
/// Returns whatever error `work` produced.
pub async fn with_processing_indicator<T, F>(
    chat: &dyn ChatApi,
    target: &MessageRef,
    name: &str,
    work: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    let indicator = ProcessingIndicator::attach(chat, target, name).await;
    let result = work.await;
    indicator.release().await;
    result
}
