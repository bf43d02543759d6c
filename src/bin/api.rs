use std::sync::Arc;

use anyhow::Context;
use linkdigest::AppError;
use linkdigest::api::{AppState, handler};
use linkdigest::core::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    linkdigest::setup_logging();

    let config = AppConfig::from_env()
        .map_err(AppError::ConfigError)
        .context("loading configuration")?;
    let state = Arc::new(AppState::from_config(&config)?);

    lambda_runtime::run(lambda_runtime::service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(&state, event).await }
    }))
    .await
}
