use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::future::Either;
use futures::stream::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use clinic_types::{ChatRequest, Session};
use crate::{error::{ApiError, ApiResult, ErrorBody}, state::AppState};

/// Open an SSE stream answering one chat request
///
/// Each frame is `data: <envelope json>\n\n`. The event sequence is
/// `start`, any number of `delta`, then either `tool` + `final` or a single
/// `final`; a mid-stream failure ends it with `error` instead.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream"),
        (status = 400, description = "Malformed request", body = ErrorBody)
    ),
    tag = "chat"
)]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected chat request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let session = Session::start(request);
    tracing::debug!(
        conversation_id = %session.conversation_id(),
        request_id = %session.request_id(),
        "Opening chat stream"
    );

    let frames = ReceiverStream::new(state.driver.spawn_stream(session));

    // Dropping the receiver at the deadline cancels the driver.
    let deadline = match state.config.server.request_timeout() {
        Some(limit) => Either::Left(tokio::time::sleep(limit)),
        None => Either::Right(futures::future::pending::<()>()),
    };
    let body_stream = frames.take_until(deadline).map(Ok::<String, Infallible>);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!("Failed to build stream response: {}", e);
            ApiError::Internal
        })
}
