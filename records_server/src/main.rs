//! School records server.
//!
//! Run from repo root: `cargo run -p records-server`
//! Storage is chosen by `STORAGE` (`memory`, `file`, `postgres`); see `ServerConfig`.

use school_records::{app, AppState, RecordsStore, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("school_records=info,records_server=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(storage = ?config.storage, "opening storage");
    let store = config.open_store().await?;
    let state = AppState::new(RecordsStore::new(store.clone()));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("School records API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    store.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
