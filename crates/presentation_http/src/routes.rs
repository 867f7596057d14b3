//! Route definitions

use std::path::Path;

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::{HeaderValue, Method},
    routing::get,
};
use infrastructure::ServerConfig;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the main router with all routes
///
/// Paths outside the API are served from `static_dir`.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Calendar bridge
        .route(
            "/a/{calendar}",
            get(handlers::calendar::list_events)
                .post(handlers::calendar::create_event)
                .delete(handlers::calendar::delete_event)
                .fallback(handlers::calendar::not_found),
        )
        // Static front-end
        .fallback_service(
            ServeDir::new(static_dir)
                .not_found_service(handlers::calendar::not_found.into_service()),
        )
        // Attach state
        .with_state(state)
}

/// Router plus the middleware stack the server runs with
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    // Last added = outermost
    create_router(state, &config.static_dir)
        .layer(RequestBodyLimitLayer::new(config.max_body_size_json_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new())
        .layer(cors_layer(&config.allowed_origins))
}

/// Any origin when none are configured, otherwise only the listed ones
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparsable CORS origin");
                None
            },
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}
