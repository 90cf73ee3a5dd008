//! Telescope Server: application entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use telescope_auth::{Authenticator, HttpRoleAuthority};
use telescope_db::DbManager;
use telescope_server::config::ServerConfig;
use telescope_server::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "telescope-server", version, about = "Telescope core API server")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "TELESCOPE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("telescope=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let db = DbManager::connect(&config.db)
        .await
        .context("connecting to SurrealDB")?;
    telescope_db::run_migrations(db.client())
        .await
        .context("running migrations")?;

    let authenticator = Authenticator::new(&config.auth).context("loading JWT public key")?;
    let authority =
        HttpRoleAuthority::new(&config.authority).context("building role authority client")?;
    info!(authority = %config.authority.base_url, "Role authority configured");

    let state = AppState::new(db.client().clone(), authenticator, authority);
    let app = telescope_server::app(state, config.cors_layer()?);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!(address = %config.bind_address, "Telescope server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Telescope server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
