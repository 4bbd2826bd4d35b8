//! The MonitorScheduler continuously polls the flight source for every
//! actively monitored area and emits notifications for flights inside it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    engine::{active_set::ActiveMonitorSet, cooldown::NotificationCooldown},
    notifier::{format::format_flight_alert, traits::NotificationSink},
    persistence::traits::AreaStore,
    source::traits::FlightSource,
};

/// Counters for one scheduler cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Subscribers polled this cycle.
    pub subscribers_polled: usize,
    /// State vectors received from the source across all subscribers.
    pub flights_seen: usize,
    /// Notifications delivered successfully.
    pub notifications_sent: usize,
    /// Subscribers whose fetch failed.
    pub source_errors: usize,
}

/// A cycle-level failure. Per-subscriber errors are contained inside the
/// cycle; this fires only when the feed failed for every polled subscriber,
/// which puts the loop on the extended backoff instead of the normal
/// interval.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The flight feed failed for all subscribers in the cycle.
    #[error("flight feed unavailable for all {subscribers} polled subscribers")]
    SourceUnavailable {
        /// How many subscribers were affected.
        subscribers: usize,
    },
}

/// The scheduler service.
///
/// Runs a continuous loop: while no areas are monitored it sleeps the idle
/// interval and makes no external calls; otherwise it sweeps a snapshot of
/// the active set, emitting at most one notification per
/// (subscriber, aircraft) pair per cooldown window. The cooldown state is
/// owned here exclusively.
pub struct MonitorScheduler<
    S: FlightSource + ?Sized,
    N: NotificationSink + ?Sized,
    R: AreaStore + ?Sized,
> {
    /// Shared application configuration.
    config: Arc<AppConfig>,
    /// The run-time registry of monitored areas.
    active_areas: Arc<ActiveMonitorSet>,
    /// The flight-state feed.
    source: Arc<S>,
    /// The notification destination.
    sink: Arc<N>,
    /// The area store, used only for the best-effort notification event log.
    store: Arc<R>,
    /// Per-(subscriber, aircraft) suppression state.
    cooldown: NotificationCooldown,
    /// A token used to signal a graceful shutdown.
    cancellation_token: CancellationToken,
}

impl<S: FlightSource + ?Sized, N: NotificationSink + ?Sized, R: AreaStore + ?Sized>
    MonitorScheduler<S, N, R>
{
    /// Creates a new MonitorScheduler instance.
    pub fn new(
        config: Arc<AppConfig>,
        active_areas: Arc<ActiveMonitorSet>,
        source: Arc<S>,
        sink: Arc<N>,
        store: Arc<R>,
        cancellation_token: CancellationToken,
    ) -> Self {
        let cooldown = NotificationCooldown::new(config.cooldown, config.cooldown_expiry);
        Self { config, active_areas, source, sink, store, cooldown, cancellation_token }
    }

    /// Starts the long-running scheduler loop.
    ///
    /// The only suspension point is the inter-cycle sleep, raced against the
    /// cancellation token; shutdown takes effect between cycles.
    pub async fn run(mut self) {
        tracing::info!("Monitor scheduler started.");
        loop {
            let delay = if self.active_areas.is_empty() {
                self.config.idle_poll_interval
            } else {
                match self.run_cycle(Utc::now()).await {
                    Ok(stats) => {
                        tracing::debug!(
                            subscribers = stats.subscribers_polled,
                            flights = stats.flights_seen,
                            notified = stats.notifications_sent,
                            "Cycle complete."
                        );
                        self.config.poll_interval
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduler cycle failed. Backing off before the next cycle.");
                        self.config.error_backoff
                    }
                }
            };

            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Monitor scheduler cancellation signal received, shutting down...");
                    break;
                }

                _ = tokio::time::sleep(delay) => {}
            }
        }
        tracing::info!("Monitor scheduler has shut down.");
    }

    /// Performs one full sweep over a snapshot of the active areas.
    ///
    /// One subscriber's source failure never aborts the sweep for the
    /// others; a sink failure is logged and leaves the cooldown unrecorded
    /// so delivery is retried next cycle.
    async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleStats, CycleError> {
        let snapshot = self.active_areas.snapshot();
        let mut stats = CycleStats::default();

        for area in &snapshot {
            stats.subscribers_polled += 1;

            let states = match self.source.fetch_states(&area.bounds).await {
                Ok(states) => states,
                Err(e) => {
                    tracing::warn!(
                        subscriber_id = %area.subscriber_id,
                        error = %e,
                        "Flight source unavailable; treating as zero flights for this subscriber."
                    );
                    stats.source_errors += 1;
                    continue;
                }
            };

            for state in states {
                stats.flights_seen += 1;

                if state.on_ground {
                    continue;
                }
                let Some((lat, lon)) = state.position() else {
                    continue;
                };
                if !area.bounds.contains(lat, lon) {
                    continue;
                }
                if !self.cooldown.should_notify(&area.subscriber_id, &state.aircraft_id, now) {
                    continue;
                }

                let text = format_flight_alert(&area.bounds, &state, now);
                match self.sink.send(&area.subscriber_id, &text).await {
                    Ok(()) => {
                        self.cooldown.record(&area.subscriber_id, &state.aircraft_id, now);
                        stats.notifications_sent += 1;
                        tracing::info!(
                            subscriber_id = %area.subscriber_id,
                            aircraft_id = %state.aircraft_id,
                            "Notification sent."
                        );
                        if let Err(e) = self
                            .store
                            .record_notification(&area.subscriber_id, &state.aircraft_id)
                            .await
                        {
                            tracing::warn!(error = %e, "Failed to append notification event.");
                        }
                    }
                    Err(e) => {
                        // Leave the cooldown unrecorded: suppression must not
                        // hide a failed delivery.
                        tracing::error!(
                            subscriber_id = %area.subscriber_id,
                            aircraft_id = %state.aircraft_id,
                            error = %e,
                            "Failed to deliver notification."
                        );
                    }
                }
            }
        }

        self.cooldown.sweep(now);

        if stats.subscribers_polled > 0 && stats.source_errors == stats.subscribers_polled {
            return Err(CycleError::SourceUnavailable { subscribers: stats.source_errors });
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use reqwest::StatusCode;

    use super::*;
    use crate::{
        models::AircraftStateVector,
        notifier::traits::{MockNotificationSink, SinkError},
        persistence::traits::MockAreaStore,
        source::traits::{MockFlightSource, SourceError},
        test_helpers::{AreaBuilder, StateVectorBuilder},
    };

    struct TestHarness {
        config: Arc<AppConfig>,
        active_areas: Arc<ActiveMonitorSet>,
        mock_source: MockFlightSource,
        mock_sink: MockNotificationSink,
        mock_store: MockAreaStore,
    }

    impl TestHarness {
        fn new() -> Self {
            Self {
                config: Arc::new(AppConfig::default()),
                active_areas: Arc::new(ActiveMonitorSet::new()),
                mock_source: MockFlightSource::new(),
                mock_sink: MockNotificationSink::new(),
                mock_store: MockAreaStore::new(),
            }
        }

        fn build(self) -> MonitorScheduler<MockFlightSource, MockNotificationSink, MockAreaStore> {
            MonitorScheduler::new(
                self.config,
                self.active_areas,
                Arc::new(self.mock_source),
                Arc::new(self.mock_sink),
                Arc::new(self.mock_store),
                CancellationToken::new(),
            )
        }
    }

    fn jaipur_flight() -> AircraftStateVector {
        StateVectorBuilder::new("800c42").callsign("AIC442").position(26.90, 75.78).build()
    }

    #[tokio::test]
    async fn empty_active_set_makes_no_external_calls() {
        let harness = TestHarness::new();
        // No expectations on any mock: a single call would panic.
        let mut scheduler = harness.build();

        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();
        assert_eq!(stats, CycleStats::default());
    }

    #[tokio::test]
    async fn airborne_flight_inside_area_is_notified_once_per_cooldown_window() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        let flight = jaipur_flight();
        harness.mock_source.expect_fetch_states().times(3).returning(move |_| Ok(vec![flight.clone()]));
        // Cycle 1 notifies, cycle 2 five minutes later is suppressed, cycle 3
        // thirty-one minutes later notifies again.
        harness.mock_sink.expect_send().times(2).returning(|_, _| Ok(()));
        harness.mock_store.expect_record_notification().times(2).returning(|_, _| Ok(()));

        let mut scheduler = harness.build();
        let t0 = Utc::now();

        let stats = scheduler.run_cycle(t0).await.unwrap();
        assert_eq!(stats.notifications_sent, 1);

        let stats = scheduler.run_cycle(t0 + Duration::minutes(5)).await.unwrap();
        assert_eq!(stats.notifications_sent, 0);
        assert_eq!(stats.flights_seen, 1);

        let stats = scheduler.run_cycle(t0 + Duration::minutes(31)).await.unwrap();
        assert_eq!(stats.notifications_sent, 1);
    }

    #[tokio::test]
    async fn grounded_flight_is_never_notified() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        let flight = StateVectorBuilder::new("800c42").position(26.90, 75.78).on_ground(true).build();
        harness.mock_source.expect_fetch_states().times(1).returning(move |_| Ok(vec![flight.clone()]));
        harness.mock_sink.expect_send().times(0);

        let mut scheduler = harness.build();
        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();

        assert_eq!(stats.flights_seen, 1);
        assert_eq!(stats.notifications_sent, 0);
    }

    #[tokio::test]
    async fn unknown_position_is_skipped() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        let flight = StateVectorBuilder::new("800c42").build(); // no position
        harness.mock_source.expect_fetch_states().times(1).returning(move |_| Ok(vec![flight.clone()]));
        harness.mock_sink.expect_send().times(0);

        let mut scheduler = harness.build();
        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();
        assert_eq!(stats.notifications_sent, 0);
    }

    #[tokio::test]
    async fn flight_outside_the_box_is_skipped() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        let flight = StateVectorBuilder::new("800c42").position(27.50, 75.78).build();
        harness.mock_source.expect_fetch_states().times(1).returning(move |_| Ok(vec![flight.clone()]));
        harness.mock_sink.expect_send().times(0);

        let mut scheduler = harness.build();
        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();
        assert_eq!(stats.notifications_sent, 0);
    }

    #[tokio::test]
    async fn boundary_positions_count_as_inside() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        // Exactly on the north edge and the east edge of the default box.
        let flight = StateVectorBuilder::new("800c42").position(26.95, 75.82).build();
        harness.mock_source.expect_fetch_states().times(1).returning(move |_| Ok(vec![flight.clone()]));
        harness.mock_sink.expect_send().times(1).returning(|_, _| Ok(()));
        harness.mock_store.expect_record_notification().times(1).returning(|_, _| Ok(()));

        let mut scheduler = harness.build();
        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();
        assert_eq!(stats.notifications_sent, 1);
    }

    #[tokio::test]
    async fn overlapping_subscribers_are_notified_independently() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub-a").build());
        harness
            .active_areas
            .insert(AreaBuilder::new("sub-b").bounds(27.0, 26.8, 75.9, 75.7).build());

        let flight = jaipur_flight();
        harness.mock_source.expect_fetch_states().times(2).returning(move |_| Ok(vec![flight.clone()]));
        harness
            .mock_sink
            .expect_send()
            .times(2)
            .withf(|subscriber_id, _| subscriber_id == "sub-a" || subscriber_id == "sub-b")
            .returning(|_, _| Ok(()));
        harness.mock_store.expect_record_notification().times(2).returning(|_, _| Ok(()));

        let mut scheduler = harness.build();
        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();

        // Each subscriber receives exactly one notification for the same
        // aircraft; the cooldown keys are per subscriber.
        assert_eq!(stats.notifications_sent, 2);
    }

    #[tokio::test]
    async fn one_failing_subscriber_does_not_starve_the_others() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub-x").bounds(40.0, 39.0, 11.0, 10.0).build());
        harness.active_areas.insert(AreaBuilder::new("sub-y").build());

        let flight = jaipur_flight();
        harness.mock_source.expect_fetch_states().times(2).returning(move |bounds| {
            if bounds.north_lat == 40.0 {
                Err(SourceError::BadStatus(StatusCode::BAD_GATEWAY))
            } else {
                Ok(vec![flight.clone()])
            }
        });
        harness
            .mock_sink
            .expect_send()
            .times(1)
            .withf(|subscriber_id, _| subscriber_id == "sub-y")
            .returning(|_, _| Ok(()));
        harness.mock_store.expect_record_notification().times(1).returning(|_, _| Ok(()));

        let mut scheduler = harness.build();
        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();

        assert_eq!(stats.source_errors, 1);
        assert_eq!(stats.notifications_sent, 1);
    }

    #[tokio::test]
    async fn feed_down_for_everyone_is_a_cycle_failure() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        harness
            .mock_source
            .expect_fetch_states()
            .times(1)
            .returning(|_| Err(SourceError::BadStatus(StatusCode::SERVICE_UNAVAILABLE)));

        let mut scheduler = harness.build();
        let result = scheduler.run_cycle(Utc::now()).await;

        assert!(matches!(result, Err(CycleError::SourceUnavailable { subscribers: 1 })));
    }

    #[tokio::test]
    async fn sink_failure_leaves_the_cooldown_unrecorded() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        let flight = jaipur_flight();
        harness.mock_source.expect_fetch_states().times(2).returning(move |_| Ok(vec![flight.clone()]));

        // First delivery fails, so the same cycle timestamp must produce a
        // second attempt instead of a suppressed notification.
        let mut attempts = 0;
        harness.mock_sink.expect_send().times(2).returning(move |_, _| {
            attempts += 1;
            if attempts == 1 {
                Err(SinkError::BadStatus(StatusCode::INTERNAL_SERVER_ERROR))
            } else {
                Ok(())
            }
        });
        harness.mock_store.expect_record_notification().times(1).returning(|_, _| Ok(()));

        let mut scheduler = harness.build();
        let t0 = Utc::now();

        let stats = scheduler.run_cycle(t0).await.unwrap();
        assert_eq!(stats.notifications_sent, 0);

        let stats = scheduler.run_cycle(t0).await.unwrap();
        assert_eq!(stats.notifications_sent, 1);
    }

    #[tokio::test]
    async fn event_log_failure_does_not_fail_the_cycle() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        let flight = jaipur_flight();
        harness.mock_source.expect_fetch_states().times(1).returning(move |_| Ok(vec![flight.clone()]));
        harness.mock_sink.expect_send().times(1).returning(|_, _| Ok(()));
        harness.mock_store.expect_record_notification().times(1).returning(|_, _| {
            Err(crate::persistence::error::PersistenceError::OperationFailed("disk full".into()))
        });

        let mut scheduler = harness.build();
        let stats = scheduler.run_cycle(Utc::now()).await.unwrap();
        assert_eq!(stats.notifications_sent, 1);
    }

    #[tokio::test]
    async fn mid_cycle_removal_takes_effect_next_cycle() {
        let mut harness = TestHarness::new();
        harness.active_areas.insert(AreaBuilder::new("sub").build());

        let flight = jaipur_flight();
        harness.mock_source.expect_fetch_states().times(1).returning(move |_| Ok(vec![flight.clone()]));
        harness.mock_sink.expect_send().times(1).returning(|_, _| Ok(()));
        harness.mock_store.expect_record_notification().times(1).returning(|_, _| Ok(()));

        let active_areas = Arc::clone(&harness.active_areas);
        let mut scheduler = harness.build();

        let t0 = Utc::now();
        scheduler.run_cycle(t0).await.unwrap();

        // Stop monitoring; the next cycle polls nobody.
        active_areas.remove("sub");
        let stats = scheduler.run_cycle(t0 + Duration::minutes(31)).await.unwrap();
        assert_eq!(stats.subscribers_polled, 0);
    }
}
