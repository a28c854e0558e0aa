mod auth;
mod config;
mod db;
mod detection;
mod errors;
mod models;
mod rewrite;
mod routes;
mod state;
mod subscription;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::detection::scoring::UniformScorer;
use crate::models::records::PgRecordStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::subscription::entitlement::PgSubscriptionStore;

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

    info!("Starting Detector API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Initialize the detection scorer (placeholder — swap for a real
    // classifier behind the same ScoringPolicy trait)
    let scorer = Arc::new(UniformScorer::from_entropy());
    info!("Scoring policy initialized (uniform placeholder)");

    // Build app state
    let state = AppState {
        scorer,
        subscriptions: Arc::new(PgSubscriptionStore::new(db.clone())),
        records: Arc::new(PgRecordStore::new(db)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
