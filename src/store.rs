//! Record store for detections, weather readings and users.
//!
//! Every operation is a single `INSERT ... RETURNING` (or probe) through the
//! shared pool. The server aborts any statement running past the configured
//! query timeout (`statement_timeout`, see [`crate::Config::connect_options`]);
//! the client gives up [`CLIENT_GRACE`] later. Nothing is retried; a failure is
//! mapped to [`StorageError`] and handed back to the caller.

use std::{future::Future, time::Duration};

use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{Detection, NewDetection, NewUser, NewWeatherReading, User, WeatherReading};

// ---

const DETECTION_COLUMNS: &str = "id, detection_type, confidence, bbox_x, bbox_y, bbox_width, \
     bbox_height, image_path, camera_id, processed, timestamp, created_at";

const WEATHER_COLUMNS: &str = "id, temperature, humidity, wind_speed, wind_direction, pressure, \
     rainfall, sensor_id, timestamp, created_at";

const USER_COLUMNS: &str = "id, username, email, hashed_password, full_name, is_active, is_admin, \
     created_at, updated_at";

/// Margin past the server-side `statement_timeout` before a call is abandoned.
const CLIENT_GRACE: Duration = Duration::from_secs(2);

/// Pooled handle to the relational store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
    query_timeout: Duration,
}

impl Store {
    // ---
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Insert a detection and return the stored row.
    pub async fn create_detection(&self, new: &NewDetection) -> Result<Detection, StorageError> {
        // ---
        let bbox = new.bbox;
        let sql = format!(
            r#"
            INSERT INTO detections (
                detection_type, confidence,
                bbox_x, bbox_y, bbox_width, bbox_height,
                image_path, camera_id, processed, timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {DETECTION_COLUMNS}
            "#
        );

        let row = self
            .bounded(
                "create_detection",
                sqlx::query_as::<_, Detection>(&sql)
                    .bind(new.detection_type.as_str())
                    .bind(new.confidence)
                    .bind(bbox.map(|b| b.x))
                    .bind(bbox.map(|b| b.y))
                    .bind(bbox.map(|b| b.width))
                    .bind(bbox.map(|b| b.height))
                    .bind(&new.image_path)
                    .bind(&new.camera_id)
                    .bind(new.processed)
                    .bind(new.timestamp)
                    .fetch_one(&self.pool),
            )
            .await?;

        info!(
            "Stored detection id={} type={} camera={}",
            row.id,
            row.detection_type,
            row.camera_id.as_deref().unwrap_or("-")
        );
        Ok(row)
    }

    /// Insert a weather reading and return the stored row.
    pub async fn create_weather_reading(
        &self,
        new: &NewWeatherReading,
    ) -> Result<WeatherReading, StorageError> {
        // ---
        let sql = format!(
            r#"
            INSERT INTO weather_data (
                temperature, humidity, wind_speed, wind_direction,
                pressure, rainfall, sensor_id, timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {WEATHER_COLUMNS}
            "#
        );

        let row = self
            .bounded(
                "create_weather_reading",
                sqlx::query_as::<_, WeatherReading>(&sql)
                    .bind(new.temperature)
                    .bind(new.humidity)
                    .bind(new.wind_speed)
                    .bind(new.wind_direction)
                    .bind(new.pressure)
                    .bind(new.rainfall)
                    .bind(&new.sensor_id)
                    .bind(new.timestamp)
                    .fetch_one(&self.pool),
            )
            .await?;

        info!(
            "Stored weather reading id={} sensor={}",
            row.id,
            row.sensor_id.as_deref().unwrap_or("-")
        );
        Ok(row)
    }

    /// Insert a user. A taken username or email fails with
    /// [`StorageError::DuplicateKey`].
    pub async fn create_user(&self, new: &NewUser) -> Result<User, StorageError> {
        // ---
        let sql = format!(
            r#"
            INSERT INTO users (username, email, hashed_password, full_name, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = self
            .bounded(
                "create_user",
                sqlx::query_as::<_, User>(&sql)
                    .bind(&new.username)
                    .bind(&new.email)
                    .bind(&new.hashed_password)
                    .bind(&new.full_name)
                    .bind(new.is_admin)
                    .fetch_one(&self.pool),
            )
            .await?;

        info!("Created user id={} username={}", row.id, row.username);
        Ok(row)
    }

    /// Round-trip a trivial query to confirm the store is reachable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        // ---
        self.bounded("ping", sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map(|_| ())
    }

    /// Client-side bound on one store call.
    fn deadline(&self) -> Duration {
        self.query_timeout + CLIENT_GRACE
    }

    /// Run a store future under [`Store::deadline`], mapping failures.
    ///
    /// A statement cancelled by the server surfaces as a database error before
    /// this bound fires, so the insert is known not to have committed.
    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        // ---
        match tokio::time::timeout(self.deadline(), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                debug!("Store operation {} failed: {}", op, e);
                Err(StorageError::from(e))
            }
            Err(_) => {
                debug!("Store operation {} exceeded {:?}", op, self.deadline());
                Err(StorageError::Timeout)
            }
        }
    }
}
