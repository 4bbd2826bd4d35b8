//! A `FlightSource` implementation backed by an OpenSky-style REST feed.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::traits::{FlightSource, SourceError};
use crate::{geo::BoundingBox, models::AircraftStateVector};

/// Fetches state vectors from an OpenSky-style `states` endpoint.
///
/// The bounding box is passed as `lamin`/`lamax`/`lomin`/`lomax` query
/// parameters so the feed only returns states intersecting the box.
pub struct OpenSkySource {
    base_url: Url,
    client: ClientWithMiddleware,
}

/// Response envelope of the `states` endpoint.
#[derive(Debug, Deserialize)]
struct StatesResponse {
    /// Heterogeneous positional arrays, one per aircraft. Null when the feed
    /// has nothing for the queried box.
    #[serde(default)]
    states: Option<Vec<Vec<Value>>>,
}

impl OpenSkySource {
    /// Creates a new `OpenSkySource` against the given endpoint.
    pub fn new(base_url: Url, client: ClientWithMiddleware) -> Self {
        Self { base_url, client }
    }
}

#[async_trait]
impl FlightSource for OpenSkySource {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn fetch_states(
        &self,
        bounds: &BoundingBox,
    ) -> Result<Vec<AircraftStateVector>, SourceError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("lamin", bounds.south_lat),
                ("lamax", bounds.north_lat),
                ("lomin", bounds.west_lon),
                ("lomax", bounds.east_lon),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::BadStatus(status));
        }

        let body: StatesResponse = response.json().await?;
        let rows = body.states.unwrap_or_default();
        let total = rows.len();

        let vectors: Vec<AircraftStateVector> =
            rows.iter().filter_map(|row| AircraftStateVector::from_feed_row(row)).collect();

        if vectors.len() < total {
            tracing::debug!(
                dropped = total - vectors.len(),
                "Dropped malformed state rows from feed response."
            );
        }
        tracing::debug!(count = vectors.len(), "Fetched state vectors.");

        Ok(vectors)
    }
}
