//! The `MonitoringArea` model: one subscriber's monitored bounding box.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::BoundingBox;

/// A subscriber's monitored area.
///
/// Keyed by `subscriber_id`; replaced wholesale on every "set area" request,
/// including `created_at`. Never hard-deleted; `active` tracks the stored
/// soft-lifecycle flag, while the run-time polling decision is made by the
/// [`ActiveMonitorSet`](crate::engine::active_set::ActiveMonitorSet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringArea {
    /// Opaque subscriber identity, the unique key.
    pub subscriber_id: String,

    /// The monitored bounding box.
    pub bounds: BoundingBox,

    /// Stored soft-lifecycle flag; flips on start/stop monitoring.
    pub active: bool,

    /// When the area row was (re)created.
    pub created_at: DateTime<Utc>,
}

impl MonitoringArea {
    /// Creates a fresh, active area stamped with the current time.
    pub fn new(subscriber_id: impl Into<String>, bounds: BoundingBox) -> Self {
        Self { subscriber_id: subscriber_id.into(), bounds, active: true, created_at: Utc::now() }
    }
}
