mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::LazyPool;
use crate::jobs::repository::PgJobRepository;
use crate::jobs::risk::{RiskGenerator, RiskPolicy};
use crate::jobs::service::JobService;
use crate::jobs::validator::RoleValidator;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobRisk API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL pool is created on first use; warm it up without blocking startup
    let pool = Arc::new(LazyPool::new(
        &config.database_url,
        config.database_name.as_deref(),
        config.database_max_connections,
    )?);
    let warm = pool.clone();
    tokio::spawn(async move {
        match warm.get().await {
            Ok(_) => info!("Database pool ready"),
            Err(e) => warn!("Database warm-up failed, will retry on first request: {e}"),
        }
    });

    // Initialize oracle client
    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
    )?
    .with_max_retries(config.oracle_max_retries);
    if llm.has_api_key() {
        info!("Oracle client initialized (model: {})", llm.model());
    } else {
        warn!("GEMINI_API_KEY not set; role validation and scoring run on local fallbacks only");
    }

    let policy = RiskPolicy::load(config.risk_policy_path.as_deref())?;

    let jobs = JobService::new(
        Arc::new(PgJobRepository::new(pool.clone())),
        RoleValidator::new(
            llm.clone(),
            Duration::from_secs(config.oracle_timeout_secs),
        ),
        RiskGenerator::new(llm, policy),
    );

    let state = AppState {
        jobs,
        pool,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
