use std::sync::Arc;

use analysis_server::config::Config;
use analysis_server::engine::{SharedEngine, StockfishEngine};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    // A missing engine keeps the service up; analysis then answers 503.
    let engine = match StockfishEngine::new(
        &config.stockfish_path,
        config.engine_threads,
        config.engine_hash_mb,
    )
    .await
    {
        Ok(engine) => {
            tracing::info!(path = %config.stockfish_path, name = engine.name(), "Engine loaded");
            Some(engine)
        }
        Err(e) => {
            tracing::warn!(path = %config.stockfish_path, "Engine unavailable: {e}");
            None
        }
    };
    let engine: SharedEngine = Arc::new(Mutex::new(engine));

    let app = analysis_server::app(engine.clone());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    if let Some(mut sf) = engine.lock().await.take() {
        tracing::info!("Shutting down engine");
        sf.quit().await;
    }

    Ok(())
}
