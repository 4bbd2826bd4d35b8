//! The REST command surface: set-area, start/stop monitoring and read-only
//! status queries.

pub mod areas;
pub mod error;
pub mod status;

use std::{net::SocketAddr, sync::Arc, time::Instant};

use axum::{
    Router,
    routing::{get, post},
};
pub use error::ApiError;

use crate::{config::AppConfig, engine::active_set::ActiveMonitorSet, persistence::traits::AreaStore};

/// Shared state handed to every API handler.
#[derive(Clone)]
pub struct ApiState {
    /// Shared application configuration.
    pub config: Arc<AppConfig>,
    /// The durable area store.
    pub store: Arc<dyn AreaStore>,
    /// The run-time registry of monitored areas.
    pub active_areas: Arc<ActiveMonitorSet>,
    /// Process start time, for uptime reporting.
    pub started_at: Instant,
}

/// Builds the API router over the given state.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(status::status))
        .route("/areas/{subscriber_id}", get(areas::get_area).put(areas::set_area))
        .route("/areas/{subscriber_id}/start", post(areas::start_monitoring))
        .route("/areas/{subscriber_id}/stop", post(areas::stop_monitoring))
        .with_state(state)
}

/// Runs the HTTP server based on the provided application configuration.
pub async fn run_server_from_config(state: ApiState) {
    let addr: SocketAddr = state
        .config
        .server
        .listen_address
        .parse()
        .expect("Invalid server.listen_address format");

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
    tracing::info!(%addr, "API server listening.");

    axum::serve(listener, app.into_make_service()).await.expect("Server failed");
}
