//! Handler for Slack Events API callbacks.
//!
//! Answers `url_verification` handshakes and hands each `event_callback`
//! to the workflow inside its own correlation span.

use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::helpers::{err_response, ok_challenge, ok_empty};
use super::parsing::{parse_envelope, parse_event};
use crate::core::models::Envelope;
use crate::core::ports::EventDispatcher;

/// Handle a verified Events API request body.
///
/// Workflow failures are logged and still acknowledged with 200: a
/// non-2xx answer would only make Slack redeliver the same event.
pub async fn handle_event_callback(dispatcher: &dyn EventDispatcher, body: &str) -> Value {
    let envelope = match parse_envelope(body) {
        Ok(e) => e,
        Err(e) => {
            error!("{}", e);
            return err_response(400, "Invalid event envelope");
        }
    };

    let raw_event = match envelope {
        Envelope::UrlVerification { challenge } => return ok_challenge(&challenge),
        Envelope::EventCallback { event } => event,
        Envelope::Other => return ok_empty(),
    };

    let event = match parse_event(&raw_event) {
        Ok(ev) => ev,
        Err(e) => {
            warn!("Skipping unparseable event: {}", e);
            return ok_empty();
        }
    };

    let correlation_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "event",
        correlation_id = %correlation_id,
        kind = event.kind(),
        channel = event.channel().unwrap_or("-")
    );

    async {
        info!("Dispatching event");
        match dispatcher.dispatch(&event).await {
            Ok(outcome) => info!(?outcome, "Event handled"),
            Err(e) => error!("Event processing failed: {}", e),
        }
    }
    .instrument(span)
    .await;

    ok_empty()
}
