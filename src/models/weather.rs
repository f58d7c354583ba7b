//! Weather station readings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

// ---

/// Sensor id recorded when the client does not name one.
pub const DEFAULT_SENSOR_ID: &str = "DAVIS_V3_001";

/// Weather payload after per-field type checks, before normalization.
///
/// Every measurement is optional; a station may report a subset.
#[derive(Debug, Default, Validate)]
pub struct WeatherDataCreate {
    // ---
    #[validate(range(
        min = -50.0,
        max = 70.0,
        message = "temperature must be between -50.0 and 70.0 °C"
    ))]
    pub temperature: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "humidity must be between 0.0 and 100.0 %"))]
    pub humidity: Option<f64>,

    #[validate(range(min = 0.0, message = "windSpeed must not be negative"))]
    pub wind_speed: Option<f64>,

    #[validate(range(min = 0, max = 360, message = "windDirection must be between 0 and 360 degrees"))]
    pub wind_direction: Option<i32>,

    #[validate(range(min = 800.0, max = 1200.0, message = "pressure must be between 800.0 and 1200.0 hPa"))]
    pub pressure: Option<f64>,

    #[validate(range(min = 0.0, message = "rainfall must not be negative"))]
    pub rainfall: Option<f64>,

    #[validate(length(max = 50, message = "sensorId must be at most 50 characters"))]
    pub sensor_id: Option<String>,

    pub timestamp: Option<DateTime<Utc>>,
}

/// Fully populated reading, ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeatherReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub pressure: Option<f64>,
    pub rainfall: Option<f64>,
    pub sensor_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Row of the `weather_data` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeatherReading {
    pub id: i32,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub pressure: Option<f64>,
    pub rainfall: Option<f64>,
    pub sensor_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataResponse {
    pub id: i32,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub pressure: Option<f64>,
    pub rainfall: Option<f64>,
    pub sensor_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<WeatherReading> for WeatherDataResponse {
    fn from(row: WeatherReading) -> Self {
        Self {
            id: row.id,
            temperature: row.temperature,
            humidity: row.humidity,
            wind_speed: row.wind_speed,
            wind_direction: row.wind_direction,
            pressure: row.pressure,
            rainfall: row.rainfall,
            sensor_id: row.sensor_id,
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}

// ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherListItem {
    pub id: &'static str,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: i32,
    pub sensor_id: &'static str,
    pub timestamp: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataList {
    pub weather_data: Vec<WeatherListItem>,
    pub total_count: usize,
    pub iteration: &'static str,
}

impl WeatherDataList {
    /// Fixed listing served until the list endpoint is backed by the store.
    pub fn simulated() -> Self {
        // ---
        let weather_data = vec![
            WeatherListItem {
                id: "weather_001",
                temperature: 25.5,
                humidity: 45.2,
                wind_speed: 12.3,
                wind_direction: 180,
                sensor_id: DEFAULT_SENSOR_ID,
                timestamp: "2024-01-15T10:30:00Z",
            },
            WeatherListItem {
                id: "weather_002",
                temperature: 26.8,
                humidity: 42.1,
                wind_speed: 15.7,
                wind_direction: 165,
                sensor_id: DEFAULT_SENSOR_ID,
                timestamp: "2024-01-15T10:25:00Z",
            },
        ];

        Self {
            total_count: weather_data.len(),
            weather_data,
            iteration: "1",
        }
    }
}
