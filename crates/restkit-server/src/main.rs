//! Restkit demo server binary.

use std::path::PathBuf;

use anyhow::Context;
use restkit_server::metrics::init_metrics;
use restkit_server::{AppState, SettingsHandle, run_server_with_state};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Env var con la ruta de un archivo de configuracion adicional
const CONFIG_FILE_ENV: &str = "RESTKIT_CONFIG_FILE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // El primer argumento tiene prioridad sobre la variable de entorno
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_FILE_ENV).ok())
        .map(PathBuf::from);

    let settings = SettingsHandle::load(config_path.clone()).context("Failed to load settings")?;
    let current = settings.current();
    let addr = current.server.addr().context("Invalid server address")?;

    tracing::info!("Starting Restkit server v{}", restkit_server::version());
    if let Some(path) = &config_path {
        tracing::info!("Config file: {}", path.display());
    }
    tracing::info!("Cache TTL: {}s", current.cache.ttl_seconds);
    tracing::info!("Throttle rates: {:?}", current.throttle.rates);

    let prometheus_handle = init_metrics().context("Failed to install metrics recorder")?;
    let state = AppState::new(settings).context("Failed to build application state")?;

    run_server_with_state(addr, state, prometheus_handle).await?;

    Ok(())
}
