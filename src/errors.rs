use slack_morphism::errors::SlackClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to parse Slack event: {0}")]
    ParseError(String),

    #[error("Failed to access Slack API: {0}")]
    ApiError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to fetch article: {0}")]
    FetchError(String),

    #[error("Failed to access Vertex AI: {0}")]
    AiError(String),

    #[error("AI response violates the summary contract: {0}")]
    InvalidSummary(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("{0}")]
    GeneralError(String),
}

impl From<SlackClientError> for AppError {
    fn from(error: SlackClientError) -> Self {
        AppError::ApiError(error.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::HttpError(error.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::GeneralError(error.to_string())
    }
}
