mod analysis;
mod config;
mod documents;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::{AnalyzerSettings, ResumeAnalyzer};
use crate::config::Config;
use crate::llm_client::{LlmClient, SamplingConfig};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireFit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = LlmClient::new(
        &config.llm_base_url,
        SamplingConfig {
            max_new_tokens: config.llm_max_new_tokens,
            temperature: config.llm_temperature,
            top_k: config.llm_top_k,
            top_p: config.llm_top_p,
        },
        config.llm_timeout(),
    )
    .context("Failed to build completion client")?;

    // No analysis can run without a loaded model: refuse to start.
    llm.wait_until_ready(config.llm_startup_attempts)
        .await
        .with_context(|| format!("Inference engine at {} never became ready", llm.base_url()))?;

    let settings = AnalyzerSettings::from(&config);
    info!(
        "Analyzer ready: max_chunk_words={}, extraction_concurrency={}, call_timeout={:?}",
        settings.max_chunk_words, settings.extraction_concurrency, settings.call_timeout
    );

    // Build app state
    let state = AppState {
        analyzer: ResumeAnalyzer::new(Arc::new(llm), settings),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
