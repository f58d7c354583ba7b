//! Data models for detections, weather readings, users and correlation.
//!
//! Each entity has up to four shapes:
//! - `*Create`: payload after type checks, validated with `validator`
//! - `New*`: normalized record handed to the store
//! - row type: what the store returns (`sqlx::FromRow`)
//! - `*Response`: client-visible projection

mod correlation;
mod detection;
mod user;
mod weather;

pub use correlation::CorrelationResult;
pub use detection::{
    BoundingBox, Detection, DetectionCreate, DetectionKind, DetectionList, DetectionResponse,
    NewDetection, DEFAULT_CAMERA_ID,
};
pub use user::{NewUser, User, UserCreate, UserRegistration, UserResponse};
pub use weather::{
    NewWeatherReading, WeatherDataCreate, WeatherDataList, WeatherDataResponse, WeatherReading,
    DEFAULT_SENSOR_ID,
};
