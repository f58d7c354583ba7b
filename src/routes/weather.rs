//! Weather station readings, posted every few minutes per station.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use super::{bad_json, AppState};
use crate::models::{WeatherDataList, WeatherDataResponse};
use crate::{validation, ApiResult};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/v1/weather", get(list).post(create))
}

async fn create(
    State((store, _config)): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<WeatherDataResponse>> {
    // ---
    let Json(body) = payload.map_err(bad_json)?;

    let reading = validation::validate_weather(body, Utc::now())?;
    debug!("POST /api/v1/weather - validated {:?}", reading);

    let row = store.create_weather_reading(&reading).await?;
    Ok(Json(row.into()))
}

async fn list() -> Json<WeatherDataList> {
    Json(WeatherDataList::simulated())
}
