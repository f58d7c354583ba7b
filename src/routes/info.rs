//! Service banner and API v1 index.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

// ---

#[derive(Serialize)]
struct ServiceInfo {
    message: String,
    version: String,
    environment: String,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiIndex {
    message: &'static str,
    available_endpoints: [&'static str; 4],
}

/// Handle `GET /`.
async fn root(State((_store, config)): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("{} is running", config.project_name),
        version: config.version.clone(),
        environment: config.environment.clone(),
        status: "online",
    })
}

/// Handle `GET /api/v1/test`.
async fn index() -> Json<ApiIndex> {
    Json(ApiIndex {
        message: "API v1 is available",
        available_endpoints: [
            "/api/v1/detections",
            "/api/v1/weather",
            "/api/v1/users",
            "/api/v1/analysis/correlation",
        ],
    })
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/", get(root))
        .route("/api/v1/test", get(index))
}
