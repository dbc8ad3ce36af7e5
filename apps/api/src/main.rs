mod config;
mod errors;
mod llm_client;
mod models;
mod recommendations;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::recommendations::curated::CuratedCatalog;
use crate::recommendations::generative::GenerativeCandidateSource;
use crate::recommendations::links::{HttpLinkProbe, LinkValidator};
use crate::recommendations::pipeline::RecommendationPipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid env vars)
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

    info!("Starting Scholar API v{}", env!("CARGO_PKG_VERSION"));

    // Curated tier dataset (read-only, shared across requests)
    let catalog = Arc::new(CuratedCatalog::builtin().context("Failed to parse curated catalog")?);
    if catalog.is_empty() {
        warn!("Curated catalog is empty");
    } else {
        info!("Curated catalog loaded: {} scholarships", catalog.len());
    }

    // Link validator
    let probe = HttpLinkProbe::new(config.link_check_timeout)
        .context("Failed to build link check HTTP client")?;
    let validator = LinkValidator::new(
        Arc::new(probe),
        config.link_check_timeout,
        config.link_check_budget,
        config.link_check_concurrency,
    );

    let mut pipeline = RecommendationPipeline::new(validator, config.max_recommendations)
        .with_blending(config.blend_curated);

    if config.curated_tier_enabled {
        pipeline = pipeline.with_curated(catalog.clone());
    } else {
        warn!("Curated tier disabled");
    }

    // Initialize LLM client
    match (&config.gemini_api_key, config.generative_available()) {
        (Some(key), true) => {
            let llm = LlmClient::new(key.clone(), config.generation_timeout)
                .context("Failed to build LLM HTTP client")?;
            info!(
                "LLM client initialized (model: {}, key: {})",
                llm_client::MODEL,
                config.masked_api_key()
            );
            pipeline = pipeline.with_generative(GenerativeCandidateSource::new(
                Arc::new(llm),
                config.generation_timeout,
                config.max_recommendations,
            ));
        }
        _ => warn!("Generative tier disabled (set GEMINI_API_KEY to enable)"),
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        catalog,
        pipeline: Arc::new(pipeline),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
