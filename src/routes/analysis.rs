use axum::{routing::get, Json, Router};

use crate::models::CorrelationResult;

/// Handle `GET /api/v1/analysis/correlation`.
///
/// Returns the fixed placeholder assessment; nothing is computed from stored
/// detections or readings.
async fn correlation() -> Json<CorrelationResult> {
    Json(CorrelationResult::placeholder())
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api/v1/analysis/correlation", get(correlation))
}
