use axum::{extract::State, Json};
use std::sync::Arc;
use utoipa::OpenApi;

use clinic_types::{ChatRequest, UserRole};
use crate::{
    error::ErrorBody,
    handlers::chat,
    routes::health::{self, HealthResponse},
    state::AppState,
};

/// Path of the chat route relative to the configured prefix
pub const CHAT_PATH: &str = "/chat";

#[derive(OpenApi)]
#[openapi(
    info(title = "Clinic Chat API", description = "Streaming clinic assistant"),
    paths(chat::chat_stream, health::health_check),
    components(schemas(ChatRequest, UserRole, HealthResponse, ErrorBody)),
    tags(
        (name = "chat", description = "SSE chat stream"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// The document with the chat route mounted under `api_prefix`.
pub fn api_doc(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if let Some(item) = doc.paths.paths.remove(CHAT_PATH) {
        doc.paths
            .paths
            .insert(format!("{}{}", api_prefix, CHAT_PATH), item);
    }
    doc
}

pub async fn openapi_json(State(state): State<Arc<AppState>>) -> Json<utoipa::openapi::OpenApi> {
    Json(api_doc(&state.config.server.normalized_prefix()))
}
