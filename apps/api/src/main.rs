mod catalog;
mod config;
mod dataset;
mod db;
mod errors;
mod extract;
mod models;
mod ranking;
mod recommend;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderName, Request};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{Config, DatasetSource};
use crate::dataset::{Dataset, PgDataset, StaticDataset};
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing dataset source)
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

    info!("Starting rank API v{}", env!("CARGO_PKG_VERSION"));

    let dataset = open_dataset(&config).await?;
    let catalog = Arc::new(Catalog::new(dataset));

    if config.warm_cache {
        match catalog.distribution(config.default_year).await {
            Ok(table) => info!(
                "Warmed {} distribution ({} score levels)",
                config.default_year,
                table.scores().len()
            ),
            Err(e) => warn!("Could not warm {} distribution: {e}", config.default_year),
        }
    }

    let state = AppState {
        catalog,
        config: config.clone(),
    };

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let app = build_router(state)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, UuidRequestId))
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the dataset provider named by config.
async fn open_dataset(config: &Config) -> Result<Arc<dyn Dataset>> {
    match &config.dataset {
        DatasetSource::File { path } => {
            let dataset = StaticDataset::from_path(path)
                .with_context(|| format!("failed to load dataset file {}", path.display()))?;
            Ok(Arc::new(dataset))
        }
        DatasetSource::Postgres { database_url } => {
            let pool = create_pool(database_url, config.db_max_connections).await?;
            Ok(Arc::new(PgDataset::new(pool)))
        }
    }
}

/// Tags requests that arrive without an `x-request-id` with a fresh v4 uuid.
#[derive(Clone, Copy)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}
