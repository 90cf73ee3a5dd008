//! Authentication error types.

use telescope_core::error::TelescopeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is required")]
    MissingCredentials,

    #[error("authorization header format must be Bearer {{token}}")]
    MalformedHeader,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// Errors caused by the request rather than by server setup.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Crypto(_))
    }
}

impl From<AuthError> for TelescopeError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials
            | AuthError::MalformedHeader
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => TelescopeError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => TelescopeError::Internal(msg),
        }
    }
}
