//! Authentication and role authority configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for bearer token verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PEM-encoded RSA public key for JWT verification. Fixed for the
    /// lifetime of the process.
    pub jwt_public_key_pem: String,
    /// File to read the PEM from when `jwt_public_key_pem` is empty.
    pub jwt_public_key_path: Option<PathBuf>,
    /// Claim carrying the numeric user identifier (default: `user_id`).
    pub user_id_claim: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_public_key_pem: String::new(),
            jwt_public_key_path: None,
            user_id_claim: "user_id".into(),
        }
    }
}

/// Configuration for the remote role authority.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Base URL of the authority, without a trailing path
    /// (default: `http://gateway:8080`).
    pub base_url: String,
    /// Upper bound on a single authority call in seconds (default: 10).
    pub request_timeout_secs: u64,
    /// TCP connect timeout in seconds (default: 5).
    pub connect_timeout_secs: u64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://gateway:8080".into(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}
