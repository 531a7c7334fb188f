mod config;
mod error;
mod routes;
mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::services::xtream::{Credentials, PanelClient};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    /// Build a panel client for one request's credentials. Nothing is
    /// cached or reused between requests.
    pub fn panel_client(&self, creds: &Credentials) -> Result<PanelClient, AppError> {
        PanelClient::new(
            creds.clone(),
            &self.config.user_agent,
            Duration::from_millis(self.config.panel_timeout_ms),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xtream_view_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting Xtream View Server v{}", env!("CARGO_PKG_VERSION"));

    // Build application state
    let state = Arc::new(AppState {
        config,
        start_time: Instant::now(),
    });

    // Build router
    let app = Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        // Panel catalog endpoints
        .route("/api/account", post(routes::catalog::account))
        .route("/api/live/categories", post(routes::catalog::live_categories))
        .route("/api/live/streams", post(routes::catalog::live_streams))
        .route("/api/vod/categories", post(routes::catalog::vod_categories))
        .route("/api/vod/streams", post(routes::catalog::vod_streams))
        .route(
            "/api/series/categories",
            post(routes::catalog::series_categories),
        )
        .route("/api/series/list", post(routes::catalog::series_list))
        .route("/api/epg", post(routes::catalog::short_epg))
        // Stream URL resolution and export endpoints
        .route("/api/stream/url", post(routes::export::stream_url))
        .route("/api/m3u", post(routes::export::m3u))
        .route("/api/one.m3u", post(routes::export::one_m3u))
        .route("/api/xmltv", post(routes::export::xmltv))
        // HLS Proxy
        .route("/api/proxy/hls", get(routes::proxy::hls_proxy))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
