//! API Lambda handler - thin router in front of the event workflow.
//!
//! Order of checks for every request:
//! - body and headers present
//! - Slack signature valid
//! - middleware chain (retry deduplication)
//! - event dispatch

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use super::middleware::{InboundRequest, MiddlewareChain};
use super::{event_handler, helpers, parsing, signature};
use crate::ai::VertexClient;
use crate::content::ArticleResolver;
use crate::core::config::AppConfig;
use crate::core::ports::EventDispatcher;
use crate::errors::AppError;
use crate::slack::SlackClient;
use crate::worker::{Workflow, WorkflowSettings};

/// Everything a request needs, built once per process.
pub struct AppState {
    signing_secret: String,
    middleware: MiddlewareChain,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl AppState {
    #[must_use]
    pub fn new(
        signing_secret: String,
        middleware: MiddlewareChain,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            signing_secret,
            middleware,
            dispatcher,
        }
    }

    /// Wire the production Slack, article and Vertex AI clients together.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let chat = Arc::new(SlackClient::with_api_base(
            config.slack_bot_token.clone(),
            &config.slack_api_base,
        ));
        let articles = Arc::new(ArticleResolver::new()?);
        let summarizer = Arc::new(VertexClient::new(config)?);
        info!(endpoint = %summarizer.endpoint(), "Vertex AI client ready");

        let workflow = Workflow::new(
            chat,
            articles,
            summarizer,
            WorkflowSettings::from_config(config),
        );

        Ok(Self::new(
            config.slack_signing_secret.clone(),
            MiddlewareChain::standard(),
            Arc::new(workflow),
        ))
    }
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never fails at the Lambda level; malformed or unsigned requests get an
/// error status in the returned payload.
#[tracing::instrument(level = "info", skip(state, event))]
pub async fn function_handler(state: &AppState, event: LambdaEvent<Value>) -> Result<Value, Error> {
    Ok(handle_request(state, &event.payload).await)
}

/// Route one API Gateway payload and build the response payload.
pub async fn handle_request(state: &AppState, payload: &Value) -> Value {
    let Some(headers) = payload.get("headers") else {
        error!("Request missing headers");
        return helpers::err_response(400, "Missing headers");
    };

    let body = match extract_body(payload) {
        Ok(b) => b,
        Err(response) => return response,
    };

    if let Err(response) = verify_signature(body, headers, &state.signing_secret) {
        return response;
    }

    let request = InboundRequest { headers, body };
    if !state.middleware.proceed(&request) {
        return helpers::ok_empty();
    }

    event_handler::handle_event_callback(state.dispatcher.as_ref(), body).await
}

fn extract_body(payload: &Value) -> Result<&str, Value> {
    let Some(body) = payload.get("body") else {
        error!("Request missing body");
        return Err(helpers::err_response(400, "Missing body"));
    };

    let Some(body_str) = body.as_str() else {
        error!("Request body is not a string");
        return Err(helpers::err_response(400, "Invalid body format"));
    };

    Ok(body_str)
}

fn verify_signature(body: &str, headers: &Value, signing_secret: &str) -> Result<(), Value> {
    let Some(sig) = parsing::get_header_value(headers, "X-Slack-Signature") else {
        error!("Missing X-Slack-Signature header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Signature header",
        ));
    };

    let Some(timestamp) = parsing::get_header_value(headers, "X-Slack-Request-Timestamp") else {
        error!("Missing X-Slack-Request-Timestamp header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Request-Timestamp header",
        ));
    };

    if !signature::verify_slack_signature(body, timestamp, sig, signing_secret) {
        error!("Slack signature verification failed");
        return Err(helpers::err_response(401, "Invalid Slack signature"));
    }

    Ok(())
}
