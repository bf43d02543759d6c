use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

const MAX_AGE_SECS: u64 = 300;
const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Verify `X-Slack-Signature` against the request body and timestamp.
pub fn verify_slack_signature(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
) -> bool {
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    verify_slack_signature_at(request_body, timestamp, signature, signing_secret, now_secs)
}

/// Same as [`verify_slack_signature`] with an explicit clock.
pub fn verify_slack_signature_at(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
    now_secs: u64,
) -> bool {
    let Ok(ts) = timestamp.parse::<u64>() else {
        error!("Malformed X-Slack-Request-Timestamp: {}", timestamp);
        return false;
    };
    if now_secs.saturating_sub(ts) > MAX_AGE_SECS || ts > now_secs + MAX_CLOCK_SKEW_SECS {
        error!("Timestamp out of range, potential replay attack");
        return false;
    }

    let Some(expected) = compute_signature(timestamp, request_body, signing_secret) else {
        return false;
    };

    // Length-independent comparison so timing does not leak a matching prefix.
    let matches = expected.len() == signature.len()
        && expected
            .bytes()
            .zip(signature.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0;
    if !matches {
        error!("Signature verification failed");
    }
    matches
}

pub fn compute_signature(
    timestamp: &str,
    request_body: &str,
    signing_secret: &str,
) -> Option<String> {
    let base_string = format!("v0:{timestamp}:{request_body}");
    let mut mac = match Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return None;
        }
    };
    mac.update(base_string.as_bytes());
    Some(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
}
