use std::env;

pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_SUMMARIZED_LENGTH: usize = 500;
pub const DEFAULT_SUMMARY_LANGUAGE: &str = "Japanese";
pub const DEFAULT_MESSAGE_KEYWORD: &str = "https";
pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

/// How Vertex AI requests are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexAuth {
    /// `GEMINI_API_KEY`: express-mode endpoint with a `key` query parameter.
    ApiKey(String),
    /// `GOOGLE_ACCESS_TOKEN`: a fixed bearer token, for local runs and tests.
    AccessToken(String),
    /// Neither is set: Application Default Credentials, refreshed as needed.
    ApplicationDefault,
}

/// Process-wide settings, read once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    pub slack_signing_secret: String,
    pub slack_reaction_key: String,
    pub slack_processing_reaction_key: String,
    pub slack_api_base: String,
    pub google_cloud_project: String,
    pub google_cloud_location: String,
    pub google_model_name: String,
    pub vertex_auth: VertexAuth,
    pub vertex_api_base: Option<String>,
    pub max_summarized_length: usize,
    pub summary_language: String,
    pub search_grounding: bool,
    pub message_keyword: Option<String>,
    pub max_body_chars: Option<usize>,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns the name of the first missing or malformed variable.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing or malformed variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("{key}: environment variable not found"))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_summarized_length = match optional("MAX_SUMMARIZED_LENGTH") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("MAX_SUMMARIZED_LENGTH: {e}"))?,
            None => DEFAULT_MAX_SUMMARIZED_LENGTH,
        };

        let max_body_chars = optional("MAX_BODY_CHARS")
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .map_err(|e| format!("MAX_BODY_CHARS: {e}"))
            })
            .transpose()?;

        let search_grounding = match optional("SEARCH_GROUNDING") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| format!("SEARCH_GROUNDING: {raw}"))?,
            None => true,
        };

        // An explicitly empty keyword disables the gate, so this one can't go through `optional`.
        let message_keyword = match lookup("MESSAGE_KEYWORD") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
            None => Some(DEFAULT_MESSAGE_KEYWORD.to_string()),
        };

        let vertex_auth = if let Some(key) = optional("GEMINI_API_KEY") {
            VertexAuth::ApiKey(key)
        } else if let Some(token) = optional("GOOGLE_ACCESS_TOKEN") {
            VertexAuth::AccessToken(token)
        } else {
            VertexAuth::ApplicationDefault
        };

        Ok(Self {
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_signing_secret: required("SLACK_SIGNING_SECRET")?,
            slack_reaction_key: required("SLACK_REACTION_KEY")?,
            slack_processing_reaction_key: required("SLACK_PROCESSING_REACTION_KEY")?,
            slack_api_base: optional("SLACK_API_BASE")
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string()),
            google_cloud_project: required("GOOGLE_CLOUD_PROJECT")?,
            google_cloud_location: optional("GOOGLE_CLOUD_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            google_model_name: optional("GOOGLE_MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            vertex_auth,
            vertex_api_base: optional("VERTEX_API_BASE"),
            max_summarized_length,
            summary_language: optional("SUMMARY_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_SUMMARY_LANGUAGE.to_string()),
            search_grounding,
            message_keyword,
            max_body_chars,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
