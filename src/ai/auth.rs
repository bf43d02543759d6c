//! Credentials for Vertex AI requests.
//!
//! A credential is fetched for every request, so sources that refresh
//! (Application Default Credentials) keep a warm container working after the
//! first token expires.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::core::config::VertexAuth;
use crate::errors::AppError;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// OAuth access token sent as `Authorization: Bearer`.
    Bearer(String),
    /// API key sent as the `key` query parameter.
    ApiKey(String),
}

impl Credential {
    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::ApiKey(key) => request.query(&[("key", key.as_str())]),
        }
    }
}

#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn credential(&self) -> Result<Credential, AppError>;
}

/// A credential that never changes: an API key, or a token minted outside the process.
pub struct StaticCredential(pub Credential);

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn credential(&self) -> Result<Credential, AppError> {
        Ok(self.0.clone())
    }
}

/// Application Default Credentials through `gcp_auth`.
///
/// The provider is discovered on first use and caches tokens, refreshing them
/// before they expire.
#[derive(Default)]
pub struct DefaultCredentials {
    provider: OnceCell<Arc<dyn gcp_auth::TokenProvider>>,
}

#[async_trait]
impl CredentialSource for DefaultCredentials {
    async fn credential(&self) -> Result<Credential, AppError> {
        let provider = self
            .provider
            .get_or_try_init(|| async {
                let provider = gcp_auth::provider().await.map_err(|e| {
                    AppError::AiError(format!("Application Default Credentials unavailable: {e}"))
                })?;
                info!("Using Application Default Credentials for Vertex AI");
                Ok::<_, AppError>(provider)
            })
            .await?;

        let token = provider
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| AppError::AiError(format!("Failed to obtain access token: {e}")))?;
        Ok(Credential::Bearer(token.as_str().to_string()))
    }
}

#[must_use]
pub fn credential_source(auth: &VertexAuth) -> Arc<dyn CredentialSource> {
    match auth {
        VertexAuth::ApiKey(key) => Arc::new(StaticCredential(Credential::ApiKey(key.clone()))),
        VertexAuth::AccessToken(token) => {
            Arc::new(StaticCredential(Credential::Bearer(token.clone())))
        }
        VertexAuth::ApplicationDefault => Arc::new(DefaultCredentials::default()),
    }
}
