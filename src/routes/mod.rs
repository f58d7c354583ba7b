use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request},
    http::HeaderValue,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{warn, Span};
use uuid::Uuid;

use crate::{ApiError, Config, Store};

mod analysis;
mod detections;
mod health;
mod info;
mod users;
mod weather;

// ---

/// State shared by every handler.
pub type AppState = (Store, Arc<Config>);

pub fn router(store: Store, config: Config) -> Router {
    // ---
    let cors = cors_layer(&config.cors_origins);

    Router::new()
        .merge(info::router())
        .merge(health::router())
        .merge(detections::router())
        .merge(weather::router())
        .merge(users::router())
        .merge(analysis::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state((store, Arc::new(config)))
}

/// Span wrapping one request, tagged with a fresh request id.
fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    // ---
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Body that is not JSON at all, as opposed to JSON that breaks field rules.
pub(crate) fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
