use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cosign::drive::DriveClient;
use cosign::Cosigner;
use cosign_server::{router, ServerConfig};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("COSIGN_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = config
        .open_store()
        .with_context(|| format!("failed to open record store at {}", config.database))?;
    let drive = DriveClient::new(config.drive_config()).context("invalid drive configuration")?;
    let cosign_config = config.cosign_config().context("invalid owner account")?;

    if config.drive_token.is_empty() {
        tracing::warn!("no drive token configured; drive calls will be unauthenticated");
    }

    let app = router(Arc::new(Cosigner::new(store, drive, cosign_config)));

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.listen))?;

    info!(
        listen_addr = %config.listen,
        database = %config.database,
        drive_url = %config.drive_url,
        "starting cosign server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("cosign server exited unexpectedly")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
