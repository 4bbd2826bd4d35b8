//! The storage interface the rest of the service depends on.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{models::MonitoringArea, persistence::error::PersistenceError};

/// Durable storage for monitoring areas and the notification event log.
///
/// Single-writer assumption; the only atomicity required is the per-row
/// upsert.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AreaStore: Send + Sync {
    /// Inserts or replaces the area for a subscriber. REPLACE semantics: all
    /// fields are overwritten, including `created_at`.
    async fn upsert_area(&self, area: &MonitoringArea) -> Result<(), PersistenceError>;

    /// Retrieves the stored area for a subscriber, if any.
    async fn get_area(
        &self,
        subscriber_id: &str,
    ) -> Result<Option<MonitoringArea>, PersistenceError>;

    /// Flips the stored active flag for a subscriber.
    async fn set_active(&self, subscriber_id: &str, active: bool) -> Result<(), PersistenceError>;

    /// Counts areas whose stored active flag is set.
    async fn count_active(&self) -> Result<u64, PersistenceError>;

    /// Retrieves every area whose stored active flag is set. Used at boot
    /// when auto-resume is enabled.
    async fn get_active_areas(&self) -> Result<Vec<MonitoringArea>, PersistenceError>;

    /// Appends one delivered notification to the event log. Informational
    /// only; the log is never read back.
    async fn record_notification(
        &self,
        subscriber_id: &str,
        aircraft_id: &str,
    ) -> Result<(), PersistenceError>;

    /// Ensures all pending writes are flushed to disk.
    async fn flush(&self) -> Result<(), PersistenceError>;

    /// Performs any necessary cleanup operations before shutdown.
    async fn cleanup(&self) -> Result<(), PersistenceError>;
}
