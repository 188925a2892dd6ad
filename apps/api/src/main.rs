mod catalog;
mod config;
mod errors;
mod llm_client;
mod middleware;
mod models;
mod recommendation;
mod roadmap;
mod routes;
mod search;
mod state;

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::StaticCareerCatalog;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::middleware::cache::ResponseCache;
use crate::middleware::rate_limit::RateLimiter;
use crate::recommendation::advisor::CareerAdvisor;
use crate::roadmap::planner::RoadmapPlanner;
use crate::routes::build_router;
use crate::state::AppState;

const LOG_FILE: &str = "combined.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config)?;

    info!("Starting Go Career API v{}", env!("CARGO_PKG_VERSION"));

    // The catalog is required: without it there is no fallback path
    let catalog = StaticCareerCatalog::load(&config.data_dir)
        .with_context(|| format!("loading career data from {}", config.data_dir.display()))?;

    let model = Arc::new(GeminiClient::new(
        config.google_api_key.clone(),
        config.gemini_model.clone(),
    )?);
    info!("Gemini client initialized (model: {})", model.model());

    let rate_limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window);
    spawn_rate_limit_pruner(rate_limiter.clone());

    let state = AppState {
        catalog: Arc::new(catalog),
        advisor: CareerAdvisor::new(model.clone()),
        planner: RoadmapPlanner::new(model),
        cache: ResponseCache::new(config.cache_ttl),
        rate_limiter,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = bind(config.port).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Console output always; JSON lines in `<LOG_DIR>/combined.log` when configured.
fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            &config.rust_log
        ))
    });

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(log_file_appender(dir)?);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

fn log_file_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .with_context(|| format!("opening log file in {}", dir.display()))
}

/// Binds `port`, or `port + 1` if it is already taken.
async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == ErrorKind::AddrInUse => {
            let fallback = port.checked_add(1).context("no port above 65535")?;
            warn!("Port {port} is in use, trying {fallback}");
            TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], fallback)))
                .await
                .with_context(|| format!("binding port {fallback}"))
        }
        Err(e) => Err(e).with_context(|| format!("binding port {port}")),
    }
}

/// Closed rate-limit windows are dropped once per window length.
fn spawn_rate_limit_pruner(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        loop {
            ticker.tick().await;
            limiter.prune_expired();
        }
    });
}
