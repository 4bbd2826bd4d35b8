//! This module defines the interface for delivering notifications.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Custom error type for notification delivery.
///
/// A failed delivery is logged and the cooldown is not recorded, so the
/// notification is retried on the next cycle the aircraft is still inside
/// the area. There is no same-cycle retry.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The delivery request failed at the transport level.
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The sink answered with a non-success status.
    #[error("notification sink returned status {0}")]
    BadStatus(reqwest::StatusCode),
}

/// A destination for formatted flight alerts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one alert to a subscriber.
    async fn send(&self, subscriber_id: &str, text: &str) -> Result<(), SinkError>;
}
