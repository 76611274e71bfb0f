use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use weatherbot_core::Config;
use weatherbot_server::ChatService;

#[tokio::main]
async fn main() -> Result<()> {
    weatherbot_core::init()?;

    let (config, _) = Config::load_validated()?;
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind_addr))?;

    let service = Arc::new(ChatService::from_config(&config)?);
    let routes = weatherbot_server::routes(service);

    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .context("Failed to bind HTTP server")?;

    tracing::info!("Weatherbot listening on http://{}", addr);
    server.await;
    tracing::info!("Weatherbot stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler we can only run until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
