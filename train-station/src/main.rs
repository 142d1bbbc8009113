use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use train_station::config::ServerConfig;
use train_station::store::Store;
use train_station::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("train_station=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let store = Store::connect(&config.database_url, config.max_connections).await?;
    store.migrate().await?;
    info!(database = %config.database_url, "database ready");

    let auth = config.identity.authenticator()?;
    let app = create_router(AppState::new(store, auth));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Train station API listening on http://{}", config.bind_addr);
    info!("  GET       /health");
    info!("  GET|POST  /stations/  /train-types/  /trains/  /crews/  /routes/  /trips/  /orders/");
    info!("  GET       /routes/:id/");
    info!("  GET|PUT|DELETE /trips/:id/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
