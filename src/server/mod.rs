//! HTTP API.
//!
//! `POST /` runs a review of a repository URL, `GET /report` serves the
//! most recent HTML report.

mod handlers;

pub use handlers::router;

use crate::config::Config;
use crate::llm::ChatClient;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Span};

/// Shared application state for HTTP handlers.
pub struct AppState<B> {
    pub pipeline: Pipeline<B>,
    pub cors_origins: Vec<String>,
}

/// Run the HTTP server until it fails.
pub async fn run_server(config: &Config, span: Span) -> Result<()> {
    let client = ChatClient::new(config.model.client_config())?;
    let pipeline = Pipeline::from_config(config, client, span)?;

    let state = Arc::new(AppState {
        pipeline,
        cors_origins: config.server.cors_origins.clone(),
    });
    let app = router(state)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("RepoLens HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
