// src/routes/health.rs
//! API health check endpoint for the thermal monitoring service.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is running and that its store
//! is reachable. It follows the Explicit Module Boundary Pattern (EMBP):
//! - Internal to this file: endpoint handler(s) and related types
//! - Exports to the gateway (`mod.rs`): a subrouter containing the `/health` route

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
    database: &'static str,
}

/// Handle `GET /health`.
///
/// Probes the store with a bounded `SELECT 1`. Responds `200` when it
/// answers and `503` otherwise.
async fn health(State((store, _config)): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    // ---
    let (code, status, database) = match store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "connected"),
        Err(e) => {
            warn!("Health probe failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
        }
    };

    let body = HealthResponse {
        status,
        service: "thermal-monitoring-api",
        timestamp: Utc::now(),
        database,
    };
    (code, Json(body))
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
