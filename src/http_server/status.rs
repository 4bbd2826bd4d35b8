//! Represents the `/status` endpoint handler and response structure.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use super::{ApiError, ApiState};

/// Represents the response from the `/status` endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct StatusResponse {
    /// The version of the application.
    pub version: String,
    /// Subscribers currently being polled.
    pub active_monitors: usize,
    /// Areas whose stored active flag is set.
    pub stored_active_areas: u64,
    /// The scheduler cycle interval in seconds.
    pub poll_interval_secs: u64,
    /// The uptime of the application in seconds.
    pub uptime_secs: u64,
}

/// Retrieves application status.
pub async fn status(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let response = StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_monitors: state.active_areas.len(),
        stored_active_areas: state.store.count_active().await?,
        poll_interval_secs: state.config.poll_interval.as_secs(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    };
    Ok((StatusCode::OK, Json(response)))
}
