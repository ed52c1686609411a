// ABOUTME: Router assembly and the HTTP server loop.
// ABOUTME: Wires handlers to paths, adds request tracing, and shuts down on ctrl-c.

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServeArgs;
use crate::routes::{get_job, health_handler, list_jobs, meta_handler};
use crate::state::AppState;

/// Build the gateway router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/list_jobs", get(list_jobs))
        .route("/get_job", get(get_job))
        .route("/health", get(health_handler))
        .route("/meta", get(meta_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(args: &ServeArgs) -> Result<()> {
    let state = AppState::from_args(args);
    let app = build_router(state);

    let addr = args.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        feed_url = %args.feed_url,
        allow_private_networks = args.allow_private_networks,
        "Server running on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
