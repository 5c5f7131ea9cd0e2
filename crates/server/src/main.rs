//! cfpdf web front end entry point.
//!
//! Boots the HTTP API on the configured bind address. Logging goes to
//! stderr as JSON.

use anyhow::{Context, Result};
use cfpdf_client::{FetchConfig, HeadlessRenderer, Pipeline, ReqwestTransport};
use cfpdf_core::{AppConfig, TracingReporter};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let transport = ReqwestTransport::new(FetchConfig::from(&config))?;
    let renderer = HeadlessRenderer::new().await.context("launching headless browser")?;
    let pipeline = Pipeline::from_config(&config, Arc::new(transport), Arc::new(renderer), Arc::new(TracingReporter));

    let app = handler::router(handler::AppState::new(pipeline, config.output_dir.clone()));

    tracing::info!(bind = %config.bind, output_dir = %config.output_dir.display(), "Starting cfpdf web server");
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
