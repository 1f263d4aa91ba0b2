pub mod auth;
pub mod identity;
pub mod wire;

pub use auth::{AuthGateway, Credentials, NullSessionSink, SessionSink};
pub use identity::{HttpIdentityProvider, IdentityProvider};

use std::sync::Arc;

use reqwest::{Response, StatusCode};
use tracing::debug;
use url::Url;

use joblens_common::{Config, JobPosting, ListQuery, SyncError};

use wire::RawJob;

/// HTTP client for the jobs API. Every request flows through the auth
/// gateway, which owns the credential and the refresh single-flight.
pub struct JobsClient {
    gateway: Arc<AuthGateway>,
    base_url: String,
}

impl JobsClient {
    pub fn new(config: &Config, gateway: Arc<AuthGateway>) -> Result<Self, SyncError> {
        // Parse up front so a bad base URL fails at construction, not on the
        // first request.
        Url::parse(&config.api_base_url)
            .map_err(|e| SyncError::Validation(format!("invalid API base URL: {e}")))?;
        Ok(Self {
            gateway,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a reqwest client with the configured per-request timeout.
    pub fn http_client(config: &Config) -> Result<reqwest::Client, SyncError> {
        reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))
    }

    /// Fetch one page of job postings.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<JobPosting>, SyncError> {
        let url = format!("{}/api/jobs/", self.base_url);
        let params = query.params();
        let response = self
            .gateway
            .send(|http| http.get(&url).query(&params))
            .await?;
        let response = error_for_status(response).await?;
        let raw: Vec<RawJob> = response
            .json()
            .await
            .map_err(|e| SyncError::Validation(format!("malformed job list payload: {e}")))?;
        let jobs = raw
            .into_iter()
            .map(wire::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(returned = jobs.len(), "job page fetched");
        Ok(jobs)
    }

    pub async fn set_pinned(&self, job_id: &str, pinned: bool) -> Result<(), SyncError> {
        let url = format!("{}/api/jobs/pin/", self.base_url);
        let body = serde_json::json!({ "job_id": job_id, "is_pinned": pinned });
        let response = self.gateway.send(|http| http.post(&url).json(&body)).await?;
        error_for_status(response).await?;
        Ok(())
    }

    pub async fn hide_job(&self, job_id: &str) -> Result<(), SyncError> {
        let url = format!("{}/api/jobs/hide/", self.base_url);
        let body = serde_json::json!({ "job_id": job_id });
        let response = self.gateway.send(|http| http.post(&url).json(&body)).await?;
        error_for_status(response).await?;
        Ok(())
    }

    pub async fn hide_company(&self, company: &str) -> Result<(), SyncError> {
        let url = format!("{}/api/companies/hide/", self.base_url);
        let body = serde_json::json!({ "company": company });
        let response = self.gateway.send(|http| http.post(&url).json(&body)).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Kick off a server-side similarity job for `job_id`. The response is an
    /// acknowledgement only; results arrive through a later `list`.
    pub async fn find_similar(&self, job_id: &str) -> Result<(), SyncError> {
        let url = format!("{}/api/jobs/find-similar/", self.base_url);
        let body = serde_json::json!({ "job_id": job_id });
        let response = self.gateway.send(|http| http.post(&url).json(&body)).await?;
        error_for_status(response).await?;
        Ok(())
    }
}

/// Map a non-success status to the error taxonomy. 401 stays distinct so the
/// gateway's replay logic (and callers past it) can tell it apart from other
/// server failures.
pub(crate) async fn error_for_status(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(SyncError::AuthExpired);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SyncError::Server {
        status: status.as_u16(),
        message,
    })
}
