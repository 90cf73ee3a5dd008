//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use surrealdb::Connection;
use telescope_auth::{AuthError, RoleAuthority};
use telescope_core::models::principal::Principal;
use tracing::debug;

use crate::error::ApiError;
use crate::state::SharedState;

/// The authenticated caller of a protected route.
///
/// Extracting it verifies the bearer token; handlers that take a
/// `Caller` never run for unauthenticated requests.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl<C, A> FromRequestParts<SharedState<C, A>> for Caller
where
    C: Connection,
    A: RoleAuthority + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState<C, A>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().map_err(|_| AuthError::MalformedHeader))
            .transpose()?;

        match state.authenticator.authenticate(header) {
            Ok(principal) => Ok(Caller(principal)),
            Err(e) => {
                debug!(reason = %e, path = %parts.uri.path(), "Authentication failed");
                Err(e.into())
            }
        }
    }
}
