//! The run-time registry of subscribers currently being polled.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::models::MonitoringArea;

/// The set of areas the scheduler polls, keyed by subscriber id.
///
/// Mutated by the command surface (start/stop monitoring) while the
/// scheduler iterates; all iteration goes through [`snapshot`], so a
/// mid-cycle add or remove takes effect on the next cycle and never causes
/// a skipped or duplicated poll within the running one.
///
/// An area marked active in storage is not in this set until explicitly
/// started in the running process.
///
/// [`snapshot`]: ActiveMonitorSet::snapshot
#[derive(Debug, Default)]
pub struct ActiveMonitorSet {
    areas: RwLock<HashMap<String, MonitoringArea>>,
}

impl ActiveMonitorSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a subscriber's monitored area.
    pub fn insert(&self, area: MonitoringArea) {
        let mut areas = self.areas.write().unwrap_or_else(PoisonError::into_inner);
        areas.insert(area.subscriber_id.clone(), area);
    }

    /// Removes a subscriber; returns whether it was present.
    pub fn remove(&self, subscriber_id: &str) -> bool {
        let mut areas = self.areas.write().unwrap_or_else(PoisonError::into_inner);
        areas.remove(subscriber_id).is_some()
    }

    /// Whether a subscriber is currently being polled.
    pub fn contains(&self, subscriber_id: &str) -> bool {
        let areas = self.areas.read().unwrap_or_else(PoisonError::into_inner);
        areas.contains_key(subscriber_id)
    }

    /// Number of subscribers currently being polled.
    pub fn len(&self) -> usize {
        let areas = self.areas.read().unwrap_or_else(PoisonError::into_inner);
        areas.len()
    }

    /// Whether no subscriber is currently being polled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A point-in-time copy of all monitored areas.
    pub fn snapshot(&self) -> Vec<MonitoringArea> {
        let areas = self.areas.read().unwrap_or_else(PoisonError::into_inner);
        areas.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::AreaBuilder;

    #[test]
    fn insert_remove_and_contains() {
        let set = ActiveMonitorSet::new();
        assert!(set.is_empty());

        set.insert(AreaBuilder::new("a").build());
        set.insert(AreaBuilder::new("b").build());
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));

        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert!(!set.contains("a"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_replaces_existing_area() {
        let set = ActiveMonitorSet::new();
        set.insert(AreaBuilder::new("a").bounds(26.95, 26.87, 75.82, 75.74).build());
        set.insert(AreaBuilder::new("a").bounds(28.9, 28.4, 77.4, 76.8).build());

        assert_eq!(set.len(), 1);
        let snapshot = set.snapshot();
        assert_eq!(snapshot[0].bounds.north_lat, 28.9);
    }

    #[test]
    fn snapshot_is_decoupled_from_later_mutation() {
        let set = ActiveMonitorSet::new();
        set.insert(AreaBuilder::new("a").build());

        let snapshot = set.snapshot();
        set.remove("a");

        assert_eq!(snapshot.len(), 1);
        assert!(set.is_empty());
    }
}
