//! Handlers for area-related endpoints in the HTTP server.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiState};
use crate::{geo::BoundingBox, models::MonitoringArea};

/// Payload for setting a monitoring area.
#[derive(Debug, Deserialize)]
pub struct SetAreaRequest {
    /// Northern edge, degrees latitude.
    pub north_lat: f64,
    /// Southern edge, degrees latitude.
    pub south_lat: f64,
    /// Eastern edge, degrees longitude.
    pub east_lon: f64,
    /// Western edge, degrees longitude.
    pub west_lon: f64,
}

/// Retrieves a subscriber's stored area, its dimensions and whether the
/// subscriber is currently being monitored.
pub async fn get_area(
    State(state): State<ApiState>,
    Path(subscriber_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let area = state
        .store
        .get_area(&subscriber_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No monitoring area set".to_string()))?;

    let monitoring = state.active_areas.contains(&subscriber_id);
    Ok((
        StatusCode::OK,
        Json(json!({
            "area": area,
            "dimensions": area.bounds.dimensions(),
            "monitoring": monitoring,
        })),
    ))
}

/// Creates or replaces a subscriber's monitoring area.
///
/// Replacement takes effect for polling only after the subscriber issues
/// start-monitoring again; a running monitor keeps its snapshot of the old
/// box until then.
pub async fn set_area(
    State(state): State<ApiState>,
    Path(subscriber_id): Path<String>,
    Json(payload): Json<SetAreaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let bounds =
        BoundingBox::new(payload.north_lat, payload.south_lat, payload.east_lon, payload.west_lon)
            .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let area = MonitoringArea::new(subscriber_id, bounds);
    state.store.upsert_area(&area).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "area saved",
            "dimensions": bounds.dimensions(),
        })),
    ))
}

/// Starts monitoring the subscriber's stored area.
pub async fn start_monitoring(
    State(state): State<ApiState>,
    Path(subscriber_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut area = state
        .store
        .get_area(&subscriber_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Set a monitoring area first".to_string()))?;

    state.store.set_active(&subscriber_id, true).await?;
    area.active = true;
    state.active_areas.insert(area);

    tracing::info!(%subscriber_id, "Monitoring started.");
    Ok((StatusCode::OK, Json(json!({ "status": "monitoring started" }))))
}

/// Stops monitoring for the subscriber.
pub async fn stop_monitoring(
    State(state): State<ApiState>,
    Path(subscriber_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_area(&subscriber_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No monitoring area set".to_string()))?;

    let was_monitoring = state.active_areas.remove(&subscriber_id);
    state.store.set_active(&subscriber_id, false).await?;

    if was_monitoring {
        tracing::info!(%subscriber_id, "Monitoring stopped.");
    }
    Ok((StatusCode::OK, Json(json!({ "status": "monitoring stopped", "was_monitoring": was_monitoring }))))
}
