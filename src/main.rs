use anyhow::Result;
use page_latency_monitor::{build_router, create_metrics, init_tracing, AppConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    // A missing .env file is fine; the environment may be set directly.
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    info!(?config, "Loaded configuration");

    // Registering the page metrics twice aborts startup here.
    let metrics = create_metrics(&config.metrics)?;
    let app = build_router(&config, metrics);

    let endpoint = config.server.bind_addr();
    info!("Starting at endpoint:{}", endpoint);
    info!(
        "Starting page latency monitor v{}...",
        env!("CARGO_PKG_VERSION")
    );

    let listener = TcpListener::bind(&endpoint).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
