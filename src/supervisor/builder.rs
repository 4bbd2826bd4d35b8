//! This module provides the `SupervisorBuilder` for constructing a
//! `Supervisor`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{Supervisor, SupervisorError};
use crate::{
    config::AppConfig,
    engine::active_set::ActiveMonitorSet,
    notifier::traits::NotificationSink,
    persistence::traits::AreaStore,
    source::traits::FlightSource,
};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    store: Option<Arc<dyn AreaStore>>,
    source: Option<Arc<dyn FlightSource>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the area store (database connection) for the `Supervisor`.
    pub fn store(mut self, store: Arc<dyn AreaStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the flight source for the `Supervisor`.
    pub fn source(mut self, source: Arc<dyn FlightSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the notification sink for the `Supervisor`.
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Assembles and validates the components to build a `Supervisor`.
    ///
    /// When `resume_active_areas` is set, the active monitor set is
    /// pre-populated from storage so monitoring continues across restarts
    /// without subscribers re-issuing start-monitoring.
    pub async fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let store = self.store.ok_or(SupervisorError::MissingAreaStore)?;
        let source = self.source.ok_or(SupervisorError::MissingFlightSource)?;
        let sink = self.sink.ok_or(SupervisorError::MissingNotificationSink)?;

        let active_areas = Arc::new(ActiveMonitorSet::new());
        if config.resume_active_areas {
            let areas = store.get_active_areas().await?;
            tracing::info!(count = areas.len(), "Resuming active areas from storage.");
            for area in areas {
                active_areas.insert(area);
            }
        }

        Ok(Supervisor {
            config: Arc::new(config),
            store,
            source,
            sink,
            active_areas,
            cancellation_token: CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        })
    }
}
