//! The Supervisor module manages the lifecycle of the Skywatch application.
//!
//! It is the top-level owner of all major components: the area store, the
//! flight source, the notification sink, the run-time active monitor set,
//! the API server and the scheduler loop.
//!
//! ## Responsibilities
//!
//! - **Initialization**: the `SupervisorBuilder` constructs and wires all
//!   services together, injecting configuration and the database connection.
//! - **Lifecycle management**: the `Supervisor` starts all services and
//!   manages their lifetimes in a `JoinSet`.
//! - **Graceful shutdown**: it listens for shutdown signals (Ctrl+C or
//!   SIGTERM) and orchestrates a clean shutdown of all managed services.

mod builder;

use std::{sync::Arc, time::Instant};

use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::signal;

use crate::{
    config::AppConfig,
    engine::{active_set::ActiveMonitorSet, scheduler::MonitorScheduler},
    http_server::{self, ApiState},
    notifier::traits::NotificationSink,
    persistence::{error::PersistenceError, traits::AreaStore},
    source::traits::FlightSource,
};

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// An area store was not provided to the `SupervisorBuilder`.
    #[error("Missing area store for Supervisor")]
    MissingAreaStore,

    /// A flight source was not provided to the `SupervisorBuilder`.
    #[error("Missing flight source for Supervisor")]
    MissingFlightSource,

    /// A notification sink was not provided to the `SupervisorBuilder`.
    #[error("Missing notification sink for Supervisor")]
    MissingNotificationSink,

    /// Active areas could not be loaded from the store at boot.
    #[error("Failed to load active areas from store: {0}")]
    AreaLoadError(#[from] PersistenceError),
}

/// The primary runtime manager for the application.
///
/// The Supervisor owns all the major components and is responsible for their
/// startup, shutdown and health monitoring. Once `run` is called, it becomes
/// the main process loop for the entire application.
pub struct Supervisor {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// The durable area store.
    store: Arc<dyn AreaStore>,

    /// The flight-state feed.
    source: Arc<dyn FlightSource>,

    /// The notification destination.
    sink: Arc<dyn NotificationSink>,

    /// The run-time registry of monitored areas, shared between the API
    /// handlers and the scheduler.
    active_areas: Arc<ActiveMonitorSet>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: tokio_util::sync::CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: tokio::task::JoinSet<()>,
}

impl Supervisor {
    /// Returns a new `SupervisorBuilder` instance.
    ///
    /// This is the public entry point for creating a supervisor.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// Starts the supervisor and all its managed services.
    ///
    /// This method is the main entry point for the application's runtime. It
    /// performs the following steps:
    /// 1. Spawns a signal handler to listen for `SIGINT` (Ctrl+C) and
    ///    `SIGTERM`.
    /// 2. Spawns the API server (when enabled) and the scheduler loop.
    /// 3. Supervises the spawned tasks via the `JoinSet`.
    /// 4. Upon shutdown, waits for all tasks to complete and performs
    ///    graceful cleanup of the store within the shutdown timeout.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        // Clone the token for the signal handler task.
        let cancellation_token = self.cancellation_token.clone();

        // Spawn a task to listen for shutdown signals.
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler")
                    .recv()
                    .await;
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
            }

            // Notify all other tasks to begin shutting down.
            cancellation_token.cancel();
        });

        // Spawn the API server as a background task if enabled.
        if self.config.server.enabled {
            let api_state = ApiState {
                config: Arc::clone(&self.config),
                store: Arc::clone(&self.store),
                active_areas: Arc::clone(&self.active_areas),
                started_at: Instant::now(),
            };
            let http_cancellation_token = self.cancellation_token.clone();
            self.join_set.spawn(async move {
                tokio::select! {
                    _ = http_server::run_server_from_config(api_state) => {},
                    _ = http_cancellation_token.cancelled() => {
                        tracing::info!("API server received shutdown signal.");
                    }
                }
            });
        }

        // Spawn the scheduler loop.
        let scheduler = MonitorScheduler::new(
            Arc::clone(&self.config),
            Arc::clone(&self.active_areas),
            Arc::clone(&self.source),
            Arc::clone(&self.sink),
            Arc::clone(&self.store),
            self.cancellation_token.clone(),
        );
        self.join_set.spawn(async move {
            scheduler.run().await;
        });

        // --- Main Supervisor Loop ---
        // Only responsible for monitoring task health and shutdown signals.

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {
                            // Task completed successfully, continue monitoring.
                        }
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => {
                            // All tasks have completed.
                            break;
                        }
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    // Cancellation requested externally, break the loop.
                    break;
                }
            }
        }

        // --- Graceful Shutdown ---

        // Ensure all spawned tasks are properly awaited before cleanup.
        self.join_set.shutdown().await;
        tracing::info!("All supervised tasks have completed.");

        tracing::info!("Starting graceful resource cleanup...");
        let shutdown_timeout = self.config.shutdown_timeout;

        let cleanup_logic = async {
            if let Err(e) = self.store.flush().await {
                tracing::error!(error = %e, "Failed to flush pending writes, but continuing cleanup.");
            }
            if let Err(e) = self.store.cleanup().await {
                tracing::error!(error = %e, "Failed to perform area store cleanup, but continuing.");
            }
            match self.store.count_active().await {
                Ok(count) => tracing::info!(
                    stored_active_areas = count,
                    "Final state: stored active areas recorded."
                ),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not retrieve final state during cleanup.")
                }
            }
        };

        if tokio::time::timeout(shutdown_timeout, cleanup_logic).await.is_err() {
            tracing::warn!(
                "Cleanup did not complete within the timeout of {:?}. Continuing shutdown.",
                shutdown_timeout
            );
        } else {
            tracing::info!("Cleanup completed successfully.");
        }

        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}
