// Generic HTTP server using Axum
// Works on any cloud provider or self-hosted environment

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emotrack_server::{router, AppState, ServerConfig};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "emotrack_server=debug,emotrack_auth=info,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing signing secret stops the process here, before any request
    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let state = AppState::in_memory(config.auth.clone()).context("failed to build auth state")?;

    let app = router(state);

    let addr = config.bind_addr();
    tracing::info!(secure_cookies = config.auth.secure_cookies, "emotrack HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
