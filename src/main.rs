use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Notify;

mod api;
mod auth;
mod config;
mod db;
mod error;
mod gate;
mod models;
mod state;

use config::Config;
use error::Result;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (info by default, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_api=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for --config flag
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    // Check for --clean flag (headless purge)
    let headless_clean = args.iter().any(|a| a == "--clean");

    // Load configuration
    let config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    if config.uses_default_secret() {
        tracing::warn!("jwt_secret is the built-in default; set a private secret in the config file");
    }

    let state = AppState::new(&config).await?;
    tracing::info!(db = %config.db_path, "Database ready");

    // If headless clean, purge soft-deleted rows and exit
    if headless_clean {
        state.gate.clean_all().await;
        println!("Cleaned deleted tags and articles");
        return Ok(());
    }

    serve(&config, state).await
}

async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let app = api::router(state);
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { signal.notified().await })
            .await
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown server ...");
    shutdown.notify_one();

    let timeout = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(timeout, server).await {
        Ok(Ok(Ok(()))) => tracing::info!("Server exiting"),
        Ok(Ok(Err(e))) => tracing::error!("Server error: {}", e),
        Ok(Err(e)) => tracing::error!("Server task failed: {}", e),
        Err(_) => tracing::warn!("Graceful shutdown timed out after {:?}", timeout),
    }
    Ok(())
}
