// ABOUTME: Backend API module — typed schemas, the Backend trait, and its HTTP client.
// ABOUTME: The view controller only talks to the server through the Backend trait.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::HttpBackend;
pub use error::ApiError;
pub use types::*;

/// The remote bot service, one method per endpoint.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /query`: run a natural-language query.
    async fn query(&self, query: &str) -> Result<BotResponse, ApiError>;

    /// `POST /approve`: resolve a staged request.
    async fn approve(&self, request_id: &str, approved: bool) -> Result<ApprovalResult, ApiError>;

    /// `GET /pending-approvals`
    async fn pending_approvals(&self) -> Result<PendingApprovals, ApiError>;

    /// `GET /data/users`
    async fn users(&self) -> Result<Vec<UserRecord>, ApiError>;

    /// `GET /data/projects`
    async fn projects(&self) -> Result<Vec<ProjectRecord>, ApiError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}
