//! Climate Query API Server
//!
//! Read-only HTTP API over the climate observation store: precipitation,
//! station and temperature listings plus min/avg/max temperature summaries
//! over date windows.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
pub mod rate_limit;
mod routes;

pub use config::ServiceConfig;
pub use error::{ApiError, ErrorResponse};

use config::LoggingConfig;
use rate_limit::create_governor_config;
use storage::Repository;

/// Body of the index route
pub const ROUTES_HTML: &str = "Available Routes:</br>\
/api/v1.0/precipitation</br>\
/api/v1.0/stations</br>\
/api/v1.0/tobs</br>\
/api/v1.0/start</br>\
/api/v1.0/start/end";

/// Application state shared across handlers
pub struct AppState {
    /// Observation store
    pub repository: Repository,
    /// Effective configuration
    pub config: ServiceConfig,
    /// Prometheus handle, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        repository: Repository,
        config: ServiceConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            repository,
            config,
            metrics,
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let rate_limit = state.config.rate_limit.clone();

    let mut router = Router::new()
        .route("/", get(index_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1.0/precipitation", get(routes::precipitation::get_precipitation))
        .route("/api/v1.0/stations", get(routes::stations::get_stations))
        .route("/api/v1.0/tobs", get(routes::tobs::get_tobs))
        .route("/api/v1.0/:start", get(routes::summary::get_from_start))
        .route("/api/v1.0/:start/:end", get(routes::summary::get_between))
        .with_state(state);

    if rate_limit.enabled {
        let config = create_governor_config(&rate_limit)?;
        router = router.layer(GovernorLayer { config });
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}

/// List the data routes
async fn index_handler() -> Html<&'static str> {
    Html(ROUTES_HTML)
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| ApiError::Logging(format!("unknown log level `{}`", config.level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| ApiError::Logging(e.to_string()))
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, ApiError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Metrics(e.to_string()))
}

/// Open the store and serve until Ctrl-C
pub async fn run_server(config: ServiceConfig) -> Result<(), ApiError> {
    let repository =
        Repository::open(&config.database.path, config.database.max_connections).await?;

    let metrics = if config.metrics.enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let addr = config.server.address();
    let rate_limited = config.rate_limit.enabled;
    let state = Arc::new(AppState::new(repository, config, metrics));
    let app = create_router(state.clone())?;

    info!("Starting API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if rate_limited {
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    info!("Server stopped, closing store");
    state.repository.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
