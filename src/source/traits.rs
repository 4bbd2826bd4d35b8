//! This module defines the interface for fetching aircraft state vectors.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::{geo::BoundingBox, models::AircraftStateVector};

/// Custom error type for flight source operations.
///
/// Source failures are never fatal: the scheduler treats them as "no flights
/// this cycle" for the affected subscriber.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The feed request failed at the transport level (network, timeout).
    #[error("flight feed request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The feed answered with a non-success status.
    #[error("flight feed returned status {0}")]
    BadStatus(reqwest::StatusCode),

    /// The feed response body could not be decoded.
    #[error("failed to decode flight feed response: {0}")]
    Decode(#[from] reqwest::Error),
}

/// A source of current aircraft state vectors intersecting a bounding box.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Fetches the state vectors currently reported inside `bounds`.
    ///
    /// Malformed feed records are dropped silently; the returned vectors may
    /// still carry unknown positions, which callers must skip themselves.
    async fn fetch_states(
        &self,
        bounds: &BoundingBox,
    ) -> Result<Vec<AircraftStateVector>, SourceError>;
}
