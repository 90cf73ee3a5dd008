//! Server configuration loaded from a TOML file.

use std::path::{Path, PathBuf};

use axum::http::{HeaderValue, Method, header};
use serde::Deserialize;
use telescope_auth::{AuthConfig, AuthorityConfig};
use telescope_db::DbConfig;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Environment variable that replaces the configured JWT public key.
pub const PUBLIC_KEY_ENV: &str = "TELESCOPE_JWT_PUBLIC_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no JWT public key configured (set auth.jwt_public_key_pem, auth.jwt_public_key_path or {PUBLIC_KEY_ENV})")]
    MissingPublicKey,

    #[error("invalid CORS origin {0:?}")]
    Origin(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (default: `0.0.0.0:8080`).
    pub bind_address: String,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub authority: AuthorityConfig,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".into(),
            db: DbConfig::default(),
            auth: AuthConfig::default(),
            authority: AuthorityConfig::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read the file at `path` (or start from defaults), apply the
    /// environment override and resolve the public key.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.resolve_public_key(std::env::var(PUBLIC_KEY_ENV).ok())?;
        Ok(config)
    }

    /// Settle on one PEM: the environment value wins, then the inline
    /// PEM, then the key file.
    pub fn resolve_public_key(&mut self, from_env: Option<String>) -> Result<(), ConfigError> {
        if let Some(pem) = from_env.filter(|v| !v.trim().is_empty()) {
            self.auth.jwt_public_key_pem = pem;
            return Ok(());
        }
        if !self.auth.jwt_public_key_pem.trim().is_empty() {
            return Ok(());
        }
        let path = self
            .auth
            .jwt_public_key_path
            .clone()
            .ok_or(ConfigError::MissingPublicKey)?;
        self.auth.jwt_public_key_pem =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
        Ok(())
    }

    /// CORS policy for the API. Preflight requests are answered here
    /// and never reach authentication.
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let origins = if self.cors_allowed_origins.is_empty() {
            AllowOrigin::any()
        } else {
            let values = self
                .cors_allowed_origins
                .iter()
                .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::Origin(o.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(values)
        };

        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
    }
}
