//! Vertex AI (Gemini) client
//!
//! Sends one `generateContent` request per article and enforces the
//! `{summary, keywords, tweet}` response contract. Calls are never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::auth::{CredentialSource, credential_source};
use super::prompt_builder::{KEYWORD_COUNT, SYSTEM_INSTRUCTION, build_summary_prompt, truncate_chars};
use crate::core::config::{AppConfig, VertexAuth};
use crate::core::models::SummaryResult;
use crate::core::ports::Summarizer;
use crate::errors::AppError;

const MAX_OUTPUT_TOKENS: u32 = 8192;
const TEMPERATURE: f32 = 0.5;
const TOP_P: f32 = 0.95;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub struct VertexClient {
    http: Client,
    endpoint: String,
    credentials: Arc<dyn CredentialSource>,
    language: String,
    max_summary_chars: usize,
    max_body_chars: Option<usize>,
    search_grounding: bool,
}

impl VertexClient {
    /// Client authenticated the way `config.vertex_auth` says.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Self::with_credentials(config, credential_source(&config.vertex_auth))
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_credentials(
        config: &AppConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(format!("Failed to build Vertex AI client: {e}")))?;

        // API keys only work against the global express-mode endpoint.
        let endpoint = if let VertexAuth::ApiKey(_) = config.vertex_auth {
            let base = config
                .vertex_api_base
                .clone()
                .unwrap_or_else(|| default_api_base("global"));
            express_content_url(&base, &config.google_model_name)
        } else {
            let base = config
                .vertex_api_base
                .clone()
                .unwrap_or_else(|| default_api_base(&config.google_cloud_location));
            generate_content_url(
                &base,
                &config.google_cloud_project,
                &config.google_cloud_location,
                &config.google_model_name,
            )
        };

        Ok(Self {
            http,
            endpoint,
            credentials,
            language: config.summary_language.clone(),
            max_summary_chars: config.max_summarized_length,
            max_body_chars: config.max_body_chars,
            search_grounding: config.search_grounding,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn build_request_body(&self, article_text: &str) -> Value {
        let article_text = match self.max_body_chars {
            Some(limit) => truncate_chars(article_text, limit),
            None => article_text,
        };
        let prompt = build_summary_prompt(article_text, &self.language, self.max_summary_chars);

        #[cfg(feature = "debug-logs")]
        info!("Using Vertex AI prompt:\n{}", prompt);

        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
                "temperature": TEMPERATURE,
                "topP": TOP_P,
            },
        });
        if self.search_grounding {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }
        body
    }
}

#[async_trait]
impl Summarizer for VertexClient {
    async fn summarize(&self, body_text: &str) -> Result<SummaryResult, AppError> {
        info!(
            body_chars = body_text.chars().count(),
            grounding = self.search_grounding,
            "Requesting summary from Vertex AI"
        );

        let credential = self.credentials.credential().await?;
        let response = credential
            .apply(self.http.post(&self.endpoint))
            .json(&self.build_request_body(body_text))
            .send()
            .await
            .map_err(|e| AppError::AiError(format!("generateContent request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(AppError::AiError(format!(
                "generateContent HTTP {status}: {error_text}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::AiError(format!("generateContent JSON parse error: {e}")))?;

        let text = candidate_text(&payload).ok_or_else(|| {
            AppError::InvalidSummary("response contained no text candidate".to_string())
        })?;

        parse_summary(&text, self.max_summary_chars)
    }
}

#[must_use]
pub fn default_api_base(location: &str) -> String {
    if location == "global" {
        "https://aiplatform.googleapis.com".to_string()
    } else {
        format!("https://{location}-aiplatform.googleapis.com")
    }
}

#[must_use]
pub fn generate_content_url(base: &str, project: &str, location: &str, model: &str) -> String {
    format!(
        "{}/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent",
        base.trim_end_matches('/')
    )
}

#[must_use]
pub fn express_content_url(base: &str, model: &str) -> String {
    format!(
        "{}/v1/publishers/google/models/{model}:generateContent",
        base.trim_end_matches('/')
    )
}

/// Concatenated text parts of the first candidate.
fn candidate_text(payload: &Value) -> Option<String> {
    let parts = payload["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Strictly parse the model's JSON payload into a [`SummaryResult`].
///
/// One enclosing Markdown code fence is tolerated; anything else that is not
/// a JSON object with non-empty `summary`, `keywords` and `tweet` is rejected.
///
/// # Errors
///
/// Returns [`AppError::InvalidSummary`] on malformed JSON, missing keys or
/// empty fields.
pub fn parse_summary(raw: &str, max_summary_chars: usize) -> Result<SummaryResult, AppError> {
    let json_text = strip_code_fence(raw);
    let mut result: SummaryResult = serde_json::from_str(json_text)
        .map_err(|e| AppError::InvalidSummary(format!("{e}: {}", truncate_chars(raw, 200))))?;

    if result.summary.trim().is_empty() {
        return Err(AppError::InvalidSummary("summary is empty".to_string()));
    }
    if result.tweet_text.trim().is_empty() {
        return Err(AppError::InvalidSummary("tweet is empty".to_string()));
    }
    if result.keywords.is_empty() {
        return Err(AppError::InvalidSummary("keywords is empty".to_string()));
    }
    if result.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(AppError::InvalidSummary("keywords contains a blank entry".to_string()));
    }
    if result.keywords.len() != KEYWORD_COUNT {
        warn!(
            "Expected {} keywords, model returned {}",
            KEYWORD_COUNT,
            result.keywords.len()
        );
    }

    let summary_chars = result.summary.chars().count();
    if summary_chars > max_summary_chars {
        warn!(
            "Summary has {} characters, truncating to {}",
            summary_chars, max_summary_chars
        );
        result.summary = truncate_chars(&result.summary, max_summary_chars).to_string();
    }

    Ok(result)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line.
    match inner.find('\n') {
        Some(nl) => inner[nl + 1..].trim(),
        None => {
            let inner = inner.trim_start();
            match inner.get(..4) {
                Some(tag) if tag.eq_ignore_ascii_case("json") => inner[4..].trim(),
                _ => inner.trim(),
            }
        }
    }
}
