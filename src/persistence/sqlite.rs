//! This module provides a concrete implementation of the AreaStore using
//! SQLite.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

use crate::{
    geo::BoundingBox,
    models::MonitoringArea,
    persistence::{error::PersistenceError, traits::AreaStore},
};

/// A concrete implementation of the AreaStore using SQLite.
pub struct SqliteAreaStore {
    /// The SQLite connection pool used for database operations.
    pool: SqlitePool,
}

// Helper struct for mapping from the database row
#[derive(sqlx::FromRow)]
struct AreaRow {
    subscriber_id: String,
    north_lat: f64,
    south_lat: f64,
    east_lon: f64,
    west_lon: f64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<AreaRow> for MonitoringArea {
    fn from(row: AreaRow) -> Self {
        MonitoringArea {
            subscriber_id: row.subscriber_id,
            bounds: BoundingBox {
                north_lat: row.north_lat,
                south_lat: row.south_lat,
                east_lon: row.east_lon,
                west_lon: row.west_lon,
            },
            active: row.is_active,
            created_at: row.created_at,
        }
    }
}

impl SqliteAreaStore {
    /// Creates a new instance of SqliteAreaStore with the provided database
    /// URL. This will create the database file if it does not exist.
    #[tracing::instrument(level = "info")]
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        tracing::debug!(database_url, "Attempting to connect to SQLite database.");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            PersistenceError::OperationFailed(format!("Failed to connect to database: {}", e))
        })?;
        tracing::info!(database_url, "Successfully connected to SQLite database.");
        Ok(Self { pool })
    }

    /// Runs database migrations.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn run_migrations(&self) -> Result<(), PersistenceError> {
        tracing::debug!("Running database migrations.");
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            PersistenceError::MigrationError(e.to_string())
        })?;
        tracing::info!("Database migrations completed successfully.");
        Ok(())
    }

    /// Gets access to the underlying connection pool for advanced operations.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool gracefully.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn close(&self) {
        tracing::debug!("Closing SQLite connection pool.");
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed successfully.");
    }

    /// Internal helper to execute a PRAGMA command with error handling
    async fn execute_pragma(&self, pragma: &str, operation: &str) -> Result<(), PersistenceError> {
        sqlx::query(pragma)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, pragma = %pragma, operation = %operation, "Failed to execute PRAGMA command.");
                PersistenceError::OperationFailed(e.to_string())
            })?;
        Ok(())
    }

    /// Performs a WAL checkpoint with the specified mode
    async fn checkpoint_wal(&self, mode: &str) -> Result<(), PersistenceError> {
        let allowed_modes = ["PASSIVE", "TRUNCATE", "RESTART"];
        if !allowed_modes.contains(&mode) {
            return Err(PersistenceError::InvalidInput(format!(
                "Invalid WAL checkpoint mode: {}",
                mode
            )));
        }
        let pragma = format!("PRAGMA wal_checkpoint({mode})");
        self.execute_pragma(&pragma, &format!("WAL checkpoint {mode}")).await
    }

    /// Sets the synchronous mode
    async fn set_synchronous_mode(&self, mode: &str) -> Result<(), PersistenceError> {
        let allowed_modes = ["OFF", "NORMAL", "FULL"];
        if !allowed_modes.contains(&mode) {
            return Err(PersistenceError::InvalidInput(format!(
                "Invalid synchronous mode: {}",
                mode
            )));
        }
        let pragma = format!("PRAGMA synchronous = {mode}");
        self.execute_pragma(&pragma, &format!("set synchronous mode to {mode}")).await
    }

    fn operation_failed(operation: &str, error: sqlx::Error) -> PersistenceError {
        tracing::error!(error = %error, operation = %operation, "Database operation failed.");
        PersistenceError::OperationFailed(error.to_string())
    }
}

#[async_trait]
impl AreaStore for SqliteAreaStore {
    #[tracing::instrument(skip(self, area), fields(subscriber_id = %area.subscriber_id), level = "debug")]
    async fn upsert_area(&self, area: &MonitoringArea) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT OR REPLACE INTO monitoring_areas \
             (subscriber_id, north_lat, south_lat, east_lon, west_lon, is_active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&area.subscriber_id)
        .bind(area.bounds.north_lat)
        .bind(area.bounds.south_lat)
        .bind(area.bounds.east_lon)
        .bind(area.bounds.west_lon)
        .bind(area.active)
        .bind(area.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::operation_failed("upsert area", e))?;

        tracing::info!(subscriber_id = %area.subscriber_id, "Monitoring area saved.");
        Ok(())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_area(
        &self,
        subscriber_id: &str,
    ) -> Result<Option<MonitoringArea>, PersistenceError> {
        let row = sqlx::query_as::<_, AreaRow>(
            "SELECT subscriber_id, north_lat, south_lat, east_lon, west_lon, is_active, \
             created_at FROM monitoring_areas WHERE subscriber_id = ?",
        )
        .bind(subscriber_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::operation_failed("query area", e))?;

        Ok(row.map(MonitoringArea::from))
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn set_active(&self, subscriber_id: &str, active: bool) -> Result<(), PersistenceError> {
        let result = sqlx::query("UPDATE monitoring_areas SET is_active = ? WHERE subscriber_id = ?")
            .bind(active)
            .bind(subscriber_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::operation_failed("set active flag", e))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!(
                "no monitoring area for subscriber '{}'",
                subscriber_id
            )));
        }

        tracing::debug!(subscriber_id, active, "Active flag updated.");
        Ok(())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn count_active(&self) -> Result<u64, PersistenceError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM monitoring_areas WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| Self::operation_failed("count active areas", e))?;

        Ok(count as u64)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_active_areas(&self) -> Result<Vec<MonitoringArea>, PersistenceError> {
        let rows = sqlx::query_as::<_, AreaRow>(
            "SELECT subscriber_id, north_lat, south_lat, east_lon, west_lon, is_active, \
             created_at FROM monitoring_areas WHERE is_active = 1",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::operation_failed("query active areas", e))?;

        Ok(rows.into_iter().map(MonitoringArea::from).collect())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn record_notification(
        &self,
        subscriber_id: &str,
        aircraft_id: &str,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO notification_events (subscriber_id, aircraft_id, sent_at) \
             VALUES (?, ?, ?)",
        )
        .bind(subscriber_id)
        .bind(aircraft_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::operation_failed("record notification event", e))?;

        Ok(())
    }

    /// Ensures all pending writes are flushed to disk.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn flush(&self) -> Result<(), PersistenceError> {
        tracing::debug!("Flushing pending writes to disk.");

        // Temporarily set synchronous mode to FULL for maximum durability
        self.set_synchronous_mode("FULL").await?;

        // Force a checkpoint to flush WAL to main database
        self.checkpoint_wal("TRUNCATE").await?;

        // Revert synchronous mode to NORMAL for better performance during normal
        // operations
        self.set_synchronous_mode("NORMAL").await?;

        tracing::debug!("Pending writes flushed successfully.");
        Ok(())
    }

    /// Performs any necessary cleanup operations before shutdown.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn cleanup(&self) -> Result<(), PersistenceError> {
        tracing::debug!("Performing area store cleanup.");
        self.checkpoint_wal("TRUNCATE").await?;
        tracing::debug!("Area store cleanup completed.");
        Ok(())
    }
}
