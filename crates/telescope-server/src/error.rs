//! HTTP error mapping.
//!
//! Every failure leaves the API as a JSON body
//! `{"error": <code>, "message": <text>}`. Server-side failures are
//! logged in full and answered with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use telescope_auth::{AuthError, DenyReason};
use telescope_core::error::TelescopeError;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Unauthenticated(#[from] AuthError),

    /// No sufficient role, or the authority could not say.
    #[error("insufficient role on the owning project")]
    Forbidden,

    /// The owning project of the target could not be determined.
    #[error("owning project could not be resolved: {0}")]
    Unresolved(String),

    #[error(transparent)]
    Domain(#[from] TelescopeError),
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NoRole | DenyReason::AuthorityUnavailable(_) => ApiError::Forbidden,
            DenyReason::ResolutionFailed(detail) => ApiError::Unresolved(detail),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthenticated(e) if e.is_client_error() => {
                (StatusCode::UNAUTHORIZED, "unauthenticated")
            }
            ApiError::Unauthenticated(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Unresolved(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unresolved"),
            ApiError::Domain(e) => match e {
                TelescopeError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                TelescopeError::AlreadyExists { .. } => (StatusCode::CONFLICT, "conflict"),
                TelescopeError::AuthenticationFailed { .. } => {
                    (StatusCode::UNAUTHORIZED, "unauthenticated")
                }
                TelescopeError::AuthorizationDenied { .. } => (StatusCode::FORBIDDEN, "forbidden"),
                TelescopeError::Validation { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
                TelescopeError::AuthorityUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "authority_unavailable")
                }
                TelescopeError::Database(_) | TelescopeError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            error!(error = %self, code, "Request failed");
            match self {
                ApiError::Unresolved(_) => "resource could not be resolved".to_string(),
                _ => "internal server error".to_string(),
            }
        } else {
            info!(error = %self, code, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}
