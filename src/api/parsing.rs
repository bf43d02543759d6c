use serde::Deserialize;
use serde_json::Value;

use crate::core::models::{Envelope, InboundEvent};
use crate::errors::AppError;

/// Case-insensitive header lookup on an API Gateway `headers` object.
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// # Errors
///
/// Returns a parse error if the body is not a JSON Events API envelope.
pub fn parse_envelope(body: &str) -> Result<Envelope, AppError> {
    serde_json::from_str(body)
        .map_err(|e| AppError::ParseError(format!("Invalid event envelope: {e}")))
}

/// # Errors
///
/// Returns a parse error if a known event type is missing required fields.
pub fn parse_event(event: &Value) -> Result<InboundEvent, AppError> {
    InboundEvent::deserialize(event)
        .map_err(|e| AppError::ParseError(format!("Invalid event payload: {e}")))
}
