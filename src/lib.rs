/// linkdigest - A Slack bot that posts AI summaries of shared links.
///
/// A posted link, a mention or a trigger emoji reaction makes the bot fetch
/// the linked page, ask Gemini on Vertex AI for a summary plus keywords, and
/// reply with a Block Kit digest.
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for the webhook entry point
/// - slack-morphism and the Slack Web API for chat interactions
/// - reqwest + html2text to fetch and flatten articles
/// - Vertex AI `generateContent` for summaries
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use linkdigest::core::config::AppConfig;
/// use linkdigest::api::{AppState, handle_request};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     linkdigest::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let state = AppState::from_config(&config)?;
///
///     let payload = serde_json::json!({ "headers": {}, "body": "{}" });
///     let response = handle_request(&state, &payload).await;
///     println!("{response}");
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod content;
pub mod core;
pub mod errors;
pub mod slack;
pub mod utils;
pub mod worker;

pub use errors::AppError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// linkdigest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
