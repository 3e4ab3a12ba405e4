// ABOUTME: reqwest-backed implementation of the Backend trait.
// ABOUTME: One method per REST endpoint; bodies are decoded into the typed schemas.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::Backend;
use super::error::ApiError;
use super::types::{
    ApprovalResult, ApproveRequest, BotResponse, HealthStatus, PendingApprovals, ProjectRecord,
    ProjectsEnvelope, QueryRequest, UserRecord, UsersEnvelope,
};

/// HTTP client for the bot backend.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl HttpBackend {
    /// Create a client for the server at `base_url`, acting as `user_id`.
    pub fn new(base_url: &str, user_id: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, ApiError> {
        tracing::debug!(endpoint, "GET");
        let response = self.client.get(self.url(endpoint)).send().await?;
        decode(endpoint, response).await
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(endpoint, "POST");
        let response = self.client.post(self.url(endpoint)).json(body).send().await?;
        decode(endpoint, response).await
    }
}

/// Check the status and decode the body, keeping the endpoint for diagnostics.
async fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn query(&self, query: &str) -> Result<BotResponse, ApiError> {
        let body = QueryRequest {
            query,
            user_id: &self.user_id,
        };
        self.post_json("/query", &body).await
    }

    async fn approve(&self, request_id: &str, approved: bool) -> Result<ApprovalResult, ApiError> {
        let body = ApproveRequest {
            request_id,
            user_id: &self.user_id,
            approved,
        };
        self.post_json("/approve", &body).await
    }

    async fn pending_approvals(&self) -> Result<PendingApprovals, ApiError> {
        self.get_json("/pending-approvals").await
    }

    async fn users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let envelope: UsersEnvelope = self.get_json("/data/users").await?;
        Ok(envelope.users)
    }

    async fn projects(&self) -> Result<Vec<ProjectRecord>, ApiError> {
        let envelope: ProjectsEnvelope = self.get_json("/data/projects").await?;
        Ok(envelope.projects)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health").await
    }
}
