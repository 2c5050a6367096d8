mod config;
mod site;

use anyhow::Context;
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::site::SiteState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;

    let abi = config.load_abi()?;
    info!(
        contract = %config.app.contract_address,
        token_id_mode = %abi.token_id_mode(),
        "tree contract abi validated"
    );

    if !config.static_dir.is_dir() {
        warn!(
            dir = %config.static_dir.display(),
            "static directory is missing; run the wasm build first"
        );
    }

    let app = site::router(SiteState::new(config.static_dir.clone(), config.app.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("App listening on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("tree-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to install Ctrl-C handler; shutdown only by termination");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
