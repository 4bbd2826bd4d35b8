//! Per-(subscriber, aircraft) notification cooldown.

use std::{collections::HashMap, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};

/// Tracks when each (subscriber, aircraft) pair was last notified and
/// suppresses repeats inside the cooldown window.
///
/// This is a memory-bound cache, not a durable log: entries older than the
/// expiry window are purged by [`sweep`], which the scheduler runs once per
/// cycle. Owned exclusively by the scheduler; pure TTL, no eviction order.
///
/// [`sweep`]: NotificationCooldown::sweep
#[derive(Debug)]
pub struct NotificationCooldown {
    window: Duration,
    expiry: Duration,
    last_notified: HashMap<(String, String), DateTime<Utc>>,
}

impl NotificationCooldown {
    /// Creates a cooldown with the given suppression window and entry expiry.
    pub fn new(window: StdDuration, expiry: StdDuration) -> Self {
        Self {
            window: Duration::from_std(window).unwrap_or(Duration::MAX),
            expiry: Duration::from_std(expiry).unwrap_or(Duration::MAX),
            last_notified: HashMap::new(),
        }
    }

    /// Whether a notification for the pair is currently permitted: true when
    /// no record exists or the elapsed time has reached the window.
    pub fn should_notify(&self, subscriber_id: &str, aircraft_id: &str, now: DateTime<Utc>) -> bool {
        match self.last_notified.get(&(subscriber_id.to_string(), aircraft_id.to_string())) {
            Some(last) => now - *last >= self.window,
            None => true,
        }
    }

    /// Records a delivered notification for the pair.
    pub fn record(&mut self, subscriber_id: &str, aircraft_id: &str, now: DateTime<Utc>) {
        self.last_notified.insert((subscriber_id.to_string(), aircraft_id.to_string()), now);
    }

    /// Purges every record whose elapsed time has reached the expiry window.
    pub fn sweep(&mut self, now: DateTime<Utc>) {
        let expiry = self.expiry;
        self.last_notified.retain(|_, last| now - *last < expiry);
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.last_notified.len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.last_notified.is_empty()
    }
}
