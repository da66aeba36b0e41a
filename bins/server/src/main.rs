//! Stowage API Server
//!
//! Main entry point for the Stowage upload service.

use std::error::Error as _;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stowage_api::{AppState, create_router};
use stowage_core::upload::UploadService;
use stowage_shared::{AppConfig, LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    // A broken backend must not keep the server down; uploads fail instead.
    let uploads = match UploadService::connect(&config.storage).await {
        Ok(service) => {
            info!(
                kind = %config.storage.kind,
                bucket = %config.storage.bucket,
                "Upload service initialized"
            );
            service
        }
        Err(e) => {
            let cause = e.source().map(ToString::to_string).unwrap_or_default();
            warn!(
                error = %e,
                cause = %cause,
                storage = ?config.storage,
                "Storage backend unavailable, uploads will be rejected"
            );
            UploadService::uninitialized()
        }
    };

    let app = create_router(AppState::new(uploads, config.upload.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(host = %config.server.host, port = config.server.port, "Server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("stowage={0},tower_http={0}", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
