//! Client for the remote role authority.
//!
//! The authority is the sole source of truth for project roles. It
//! answers one literal role per call; ranking roles is left to the
//! [`AccessGate`](crate::gate::AccessGate). Every answer is fetched
//! fresh and no call is retried.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use telescope_core::error::TelescopeError;
use telescope_core::models::role::Role;
use telescope_core::models::{ProjectId, UserId};
use thiserror::Error;
use tracing::debug;

use crate::config::AuthorityConfig;

/// Why an authority call produced no usable answer.
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("role authority request failed: {0}")]
    Transport(String),

    #[error("role authority returned status {0}")]
    Status(u16),

    #[error("role authority response malformed: {0}")]
    Decode(String),

    #[error("role authority client misconfigured: {0}")]
    Config(String),
}

impl From<AuthorityError> for TelescopeError {
    fn from(err: AuthorityError) -> Self {
        TelescopeError::AuthorityUnavailable(err.to_string())
    }
}

/// Remote role authority capability.
///
/// `check_role` answers whether `user_id` holds `role` on
/// `project_id`. An `Err` means the answer could not be determined,
/// which callers must treat as a denial.
pub trait RoleAuthority: Send + Sync {
    fn check_role(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        role: Role,
    ) -> impl Future<Output = Result<bool, AuthorityError>> + Send;

    /// Record `user_id` as the owner of a freshly created project.
    fn register_owner(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> impl Future<Output = Result<(), AuthorityError>> + Send;

    /// Projects on which `user_id` holds any role.
    fn user_projects(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ProjectId>, AuthorityError>> + Send;
}

#[derive(Debug, Deserialize)]
struct RoleCheckResponse {
    #[serde(rename = "isRoleEnough")]
    is_role_enough: bool,
}

#[derive(Debug, Deserialize)]
struct UserProjectsResponse {
    project_ids: Vec<ProjectId>,
}

#[derive(Debug, Serialize)]
struct RegisterOwnerRequest {
    user_id: UserId,
    project_id: ProjectId,
}

/// HTTP implementation of [`RoleAuthority`].
///
/// Holds one pooled [`reqwest::Client`]; clones share the pool and are
/// safe to use from concurrent requests.
#[derive(Debug, Clone)]
pub struct HttpRoleAuthority {
    /// Base URL without a trailing slash.
    base_url: String,
    client: Client,
}

impl HttpRoleAuthority {
    pub fn new(config: &AuthorityConfig) -> Result<Self, AuthorityError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AuthorityError::Config(e.to_string()))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read the body of a successful response and decode it as `T`.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthorityError> {
        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| AuthorityError::Decode(e.to_string()))
    }
}

impl RoleAuthority for HttpRoleAuthority {
    async fn check_role(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        role: Role,
    ) -> Result<bool, AuthorityError> {
        let response = self
            .client
            .get(self.endpoint("auth/userProjectRole"))
            .query(&[
                ("user_id", user_id.to_string()),
                ("project_id", project_id.to_string()),
                ("role", role.as_str().to_string()),
            ])
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;

        let answer: RoleCheckResponse = Self::decode(response).await?;
        debug!(
            user_id,
            project_id,
            role = %role,
            granted = answer.is_role_enough,
            "Role authority answered"
        );
        Ok(answer.is_role_enough)
    }

    async fn register_owner(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<(), AuthorityError> {
        let response = self
            .client
            .post(self.endpoint("auth/createProject"))
            .json(&RegisterOwnerRequest {
                user_id,
                project_id,
            })
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn user_projects(&self, user_id: UserId) -> Result<Vec<ProjectId>, AuthorityError> {
        let response = self
            .client
            .get(self.endpoint("auth/usersProjects"))
            .query(&[("user_id", user_id.to_string())])
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;

        let answer: UserProjectsResponse = Self::decode(response).await?;
        Ok(answer.project_ids)
    }
}
