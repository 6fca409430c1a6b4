//! Car boilerplate HTTP server.
//!
//! Loads `.env`, layered settings for `APP_ENVIRONMENT`, seeds an in-memory
//! car store and serves until Ctrl-C.

use anyhow::Context;
use car_boilerplate_core::environment::SystemClock;
use car_boilerplate_core::repository::InMemoryCarRepository;
use car_boilerplate_web::{Environment, Settings, Startup, serve};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,car_boilerplate_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting car boilerplate HTTP server");

    // Load configuration
    let environment = Environment::from_env()?;
    let settings = Settings::load(environment).context("Failed to load settings")?;
    let startup = Startup::new(settings);
    let addr = startup.settings().server.bind_address();
    info!(environment = %environment, address = %addr, "Configuration loaded");

    let shutdown = CancellationToken::new();
    let repository = Arc::new(InMemoryCarRepository::with_seed_data(Arc::new(SystemClock)));
    let state = startup.configure_services(repository, shutdown.clone());
    let router = startup.configure(state)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tokio::spawn(shutdown_signal(shutdown.clone()));

    serve(listener, router, shutdown).await?;

    info!("Server stopped");
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}
