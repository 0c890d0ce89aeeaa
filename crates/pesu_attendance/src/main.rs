use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use pesu_attendance::portal::{PortalClient, PortalConfig};
use pesu_attendance::server::create_router;
use pesu_attendance::types::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Optional path to a JSON file overriding the portal configuration.
const CONFIG_ENV: &str = "PESU_PORTAL_CONFIG";
const BIND_ADDRESS_ENV: &str = "PESU_BIND_ADDRESS";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match env::var(CONFIG_ENV) {
        Ok(path) => {
            info!("Loading portal configuration from {}", path);
            PortalConfig::load_from_file(Path::new(&path))?
        }
        Err(_) => PortalConfig::default(),
    };

    let client = PortalClient::new(Arc::new(config)).context("invalid portal configuration")?;
    info!("Using portal at {}", client.config().base_url);
    let app_state = Arc::new(AppState::new(client));

    let address = env::var(BIND_ADDRESS_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!("Attendance API listening on {}", address);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
