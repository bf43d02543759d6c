//! Stages that run on every verified request before any event is dispatched.

use serde_json::Value;
use tracing::info;

use super::parsing::get_header_value;

/// Header Slack sets when it redelivers an event it considers unacknowledged.
pub const RETRY_NUM_HEADER: &str = "X-Slack-Retry-Num";
pub const RETRY_REASON_HEADER: &str = "X-Slack-Retry-Reason";

/// The parts of an inbound request a middleware may inspect.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub headers: &'a Value,
    pub body: &'a str,
}

pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    /// `false` acknowledges the request immediately and skips everything after this stage.
    fn proceed(&self, request: &InboundRequest<'_>) -> bool;
}

/// Acknowledges webhook redeliveries without running the workflow again.
///
/// Slack delivers at least once; this gate is what keeps a slow first
/// delivery from producing a second reply.
pub struct IgnoreRetries;

impl Middleware for IgnoreRetries {
    fn name(&self) -> &'static str {
        "ignore_retries"
    }

    fn proceed(&self, request: &InboundRequest<'_>) -> bool {
        match get_header_value(request.headers, RETRY_NUM_HEADER) {
            Some(retry_num) => {
                let reason = get_header_value(request.headers, RETRY_REASON_HEADER).unwrap_or("");
                info!(retry_num = %retry_num, reason = %reason, "Acknowledging Slack retry");
                false
            }
            None => true,
        }
    }
}

/// Ordered middleware stages; the first `false` short-circuits the rest.
#[derive(Default)]
pub struct MiddlewareChain {
    stages: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, stage: impl Middleware + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// The chain used in production: retry deduplication only.
    #[must_use]
    pub fn standard() -> Self {
        Self::new().with(IgnoreRetries)
    }

    #[must_use]
    pub fn proceed(&self, request: &InboundRequest<'_>) -> bool {
        for stage in &self.stages {
            if !stage.proceed(request) {
                info!(stage = stage.name(), "Request short-circuited by middleware");
                return false;
            }
        }
        true
    }
}
