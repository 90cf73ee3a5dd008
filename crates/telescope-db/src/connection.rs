//! SurrealDB connection management.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// WebSocket address (default: `127.0.0.1:8000`).
    pub url: String,
    /// Namespace (default: `telescope`).
    pub namespace: String,
    /// Database name (default: `core`).
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "telescope".into(),
            database: "core".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns the SurrealDB client shared by every repository.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, sign in as root and select the configured namespace and
    /// database.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Connected to SurrealDB");
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
