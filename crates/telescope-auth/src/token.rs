//! Bearer token verification and principal extraction.
//!
//! Tokens are RSA-signed JWTs. The algorithm named in the token header
//! must belong to the RSA PKCS#1 family; anything else (HMAC, EC, `none`)
//! is rejected before the key is used, so a token cannot talk the
//! verifier into treating the public key as a shared secret.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use telescope_core::models::UserId;
use telescope_core::models::principal::Principal;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Signing algorithms a token may declare.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization` header value of the form
/// `Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthError::MissingCredentials),
    };

    match header.split_once(' ') {
        Some((BEARER_SCHEME, token)) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Verifies bearer tokens against a fixed public key.
///
/// Construct once at startup; the parsed key is reused for every
/// request.
#[derive(Clone)]
pub struct Authenticator {
    key: DecodingKey,
    user_id_claim: String,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(config.jwt_public_key_pem.as_bytes())
            .map_err(|e| AuthError::Crypto(format!("bad public key: {e}")))?;
        Ok(Self {
            key,
            user_id_claim: config.user_id_claim.clone(),
        })
    }

    /// Authenticate a raw `Authorization` header value.
    ///
    /// This is the first gate on every protected request and performs
    /// no I/O.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let token = bearer_token(authorization)?;
        self.verify(token)
    }

    /// Verify signature and expiry of a token and build the principal.
    ///
    /// A token whose signature checks out but whose `exp` has passed
    /// yields [`AuthError::TokenExpired`]; every other failure is
    /// [`AuthError::TokenInvalid`].
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::TokenInvalid(e.to_string()))?;

        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::TokenInvalid(format!(
                "unexpected signing method: {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = jsonwebtoken::decode::<Map<String, Value>>(token, &self.key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })?;

        let user_id = claims
            .get(&self.user_id_claim)
            .and_then(numeric_id)
            .ok_or_else(|| {
                AuthError::TokenInvalid(format!("missing or non-numeric {} claim", self.user_id_claim))
            })?;

        let token_expiry = claims
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0))
            .ok_or_else(|| AuthError::TokenInvalid("invalid exp claim".into()))?;

        Ok(Principal {
            user_id,
            token_expiry,
        })
    }
}

/// Accept integral JSON numbers, including ones encoded as floats
/// (`7.0`), as identifiers.
fn numeric_id(value: &Value) -> Option<UserId> {
    if let Some(id) = value.as_i64() {
        return Some(id);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
