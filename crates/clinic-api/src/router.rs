use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::CorsConfig,
    handlers::chat,
    middleware::logging,
    openapi::{self, CHAT_PATH},
    routes::health,
    state::AppState,
};

/// Assemble routes and middleware.
///
/// No compression layer: it would buffer SSE frames.
pub fn build_router(state: Arc<AppState>) -> Router {
    let prefix = state.config.server.normalized_prefix();

    let api_routes = Router::new().route(CHAT_PATH, post(chat::chat_stream));
    let api_routes = if prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(&prefix, api_routes)
    };

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .merge(api_routes)
        .layer(middleware::from_fn(logging::log_request));

    // Bounds the time to response head; the stream body is bounded in the handler.
    if let Some(timeout) = state.config.server.request_timeout() {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    if let Some(cors) = build_cors_layer(&state.config.cors) {
        router = router.layer(cors);
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `None` when CORS is disabled: no CORS headers are sent, so browsers
/// keep to same-origin.
fn build_cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    let cors = if config.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    };

    Some(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_cors_adds_no_layer() {
        let config = CorsConfig {
            enabled: false,
            origins: vec!["*".to_string()],
        };
        assert!(build_cors_layer(&config).is_none());
    }

    #[test]
    fn test_enabled_cors_builds_layer() {
        let config = CorsConfig {
            enabled: true,
            origins: vec!["http://localhost:3000".to_string()],
        };
        assert!(build_cors_layer(&config).is_some());
    }
}
