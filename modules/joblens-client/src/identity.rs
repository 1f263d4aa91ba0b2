use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use joblens_common::SyncError;

use crate::auth::Credentials;
use crate::error_for_status;

/// Client-side seam to the identity provider. Only the gateway (and the login
/// flow) call this; the refresh protocol internals live on the other side.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange username/password for a credential pair.
    async fn login(&self, username: &str, password: &str) -> Result<Credentials, SyncError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, SyncError>;
}

#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct AccessResponse {
    access: String,
}

/// Identity provider over the remote API's token endpoints.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn login(&self, username: &str, password: &str) -> Result<Credentials, SyncError> {
        let url = format!("{}/api/login/", self.base_url);
        let body = serde_json::json!({ "username": username, "password": password });
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;
        let pair: TokenPairResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Validation(format!("malformed token payload: {e}")))?;
        Ok(Credentials {
            access: pair.access,
            refresh: pair.refresh,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, SyncError> {
        let url = format!("{}/api/login/refresh/", self.base_url);
        let body = serde_json::json!({ "refresh": refresh_token });
        debug!("requesting access token refresh");
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;
        let payload: AccessResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Validation(format!("malformed token payload: {e}")))?;
        Ok(payload.access)
    }
}
