//! Thermal camera detections: `POST` ingests one event, `GET` lists events.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use super::{bad_json, AppState};
use crate::models::{DetectionList, DetectionResponse};
use crate::{validation, ApiResult};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/v1/detections", get(list).post(create))
}

/// Handle `POST /api/v1/detections`.
///
/// Validation runs before the store is touched; a rejected payload never
/// reaches the database.
async fn create(
    State((store, _config)): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<DetectionResponse>> {
    // ---
    let Json(body) = payload.map_err(bad_json)?;

    let detection = validation::validate_detection(body, Utc::now())?;
    debug!("POST /api/v1/detections - validated {:?}", detection);

    let row = store.create_detection(&detection).await?;
    Ok(Json(row.into()))
}

/// Handle `GET /api/v1/detections`. Serves the simulated listing.
async fn list() -> Json<DetectionList> {
    Json(DetectionList::simulated())
}
