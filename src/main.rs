pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

use std::sync::Arc;

use anyhow::Result;
use config::Config;
use repository::HttpTodoRepository;
use routes::AppState;
use session::Sessions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let repository = HttpTodoRepository::new(&config)?;
    tracing::info!(api = repository.base_url(), timeout = ?config.api_timeout, "using todo backend");

    let sessions = Sessions::new(Arc::new(repository), config.session_idle);
    let app = routes::router(AppState::new(sessions, &config.api_base_url));

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
