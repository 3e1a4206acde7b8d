use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    Router,
};
use clinic_api::{build_router, config::Config, error::ApiError, state::AppState};
use clinic_types::{EventEnvelope, EventKind, EventPayload, FinalData, ToolName};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> Config {
    let mut config = Config::default();
    config.stream.start_delay_ms = 0;
    config.stream.thinking_delay_ms = 0;
    config.stream.content_delay_ms = 0;
    config.stream.tool_delay_ms = 0;
    config.stream.heartbeat_secs = None;
    config
}

fn app_with(config: Config) -> Router {
    build_router(Arc::new(AppState::with_mock_backend(config).unwrap()))
}

fn app() -> Router {
    app_with(test_config())
}

fn chat_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn chat_body(input: &str) -> Value {
    json!({
        "user_input": input,
        "business_scenario": "outpatient",
        "model_id": 1,
        "prompt_id": 2,
        "user_role": "patient"
    })
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn parse_frames(body: &str) -> Vec<EventEnvelope> {
    body.split_inclusive("\n\n")
        .map(|frame| EventEnvelope::from_sse_frame(frame).unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_chat_streams_text_answer() {
    let response = app()
        .oneshot(chat_request("/api/v1/chat", chat_body("你好")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::CONNECTION], "keep-alive");
    assert_eq!(headers["x-accel-buffering"], "no");

    let body = body_string(response).await;
    assert!(body.starts_with("data: "));
    assert!(body.ends_with("\n\n"));

    let envelopes = parse_frames(&body);
    assert_eq!(envelopes.first().unwrap().kind(), EventKind::Start);
    assert!(envelopes[1..envelopes.len() - 1]
        .iter()
        .all(|e| e.kind() == EventKind::Delta));
    assert!(matches!(
        envelopes.last().unwrap().payload,
        EventPayload::Final(FinalData::Text { .. })
    ));

    let request_id = &envelopes[0].request_id;
    assert!(envelopes.iter().all(|e| &e.request_id == request_id));
}

#[tokio::test]
async fn test_chat_trigger_ends_with_tool() {
    let response = app()
        .oneshot(chat_request("/api/v1/chat", chat_body("我该做什么检查")))
        .await
        .unwrap();

    let envelopes = parse_frames(&body_string(response).await);
    let n = envelopes.len();
    assert_eq!(envelopes[n - 2].kind(), EventKind::Tool);

    match &envelopes[n - 1].payload {
        EventPayload::Final(FinalData::Tool { data }) => {
            assert_eq!(data.tool_name, ToolName::EvidenceConclusion);
            assert_eq!(data.tool_output.len(), 7);
        }
        other => panic!("Expected tool final, got {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_triggers_and_tool() {
    let mut config = test_config();
    config.chat.tool_triggers = vec!["病历".to_string()];
    config.chat.default_tool = ToolName::PersonalizedAnalysis;

    let response = app_with(config)
        .oneshot(chat_request("/api/v1/chat", chat_body("看看我的病历")))
        .await
        .unwrap();

    let envelopes = parse_frames(&body_string(response).await);
    match &envelopes.last().unwrap().payload {
        EventPayload::Final(FinalData::Tool { data }) => {
            assert_eq!(data.tool_name, ToolName::PersonalizedAnalysis);
        }
        other => panic!("Expected tool final, got {:?}", other),
    }
}

#[tokio::test]
async fn test_supplied_conversation_id_is_echoed() {
    let mut body = chat_body("你好");
    body["conversation_id"] = json!("conv-42");

    let response = app()
        .oneshot(chat_request("/api/v1/chat", body))
        .await
        .unwrap();

    let envelopes = parse_frames(&body_string(response).await);
    assert!(envelopes.iter().all(|e| e.conversation_id == "conv-42"));
}

#[tokio::test]
async fn test_unknown_role_rejected_before_stream() {
    let mut body = chat_body("你好");
    body["user_role"] = json!("nurse");

    let response = app()
        .oneshot(chat_request("/api/v1/chat", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["code"], 400);
    assert!(body["msg"].as_str().unwrap().starts_with("Invalid request"));
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"user_input\": "))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_field_rejected() {
    let mut body = chat_body("你好");
    body.as_object_mut().unwrap().remove("model_id");

    let response = app()
        .oneshot(chat_request("/api/v1/chat", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_custom_api_prefix() {
    let mut config = test_config();
    config.server.api_prefix = "/v2/".to_string();
    let app = app_with(config);

    let response = app
        .clone()
        .oneshot(chat_request("/v2/chat", chat_body("你好")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(chat_request("/api/v1/chat", chat_body("你好")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn health_from(origin: &str) -> Request<Body> {
    Request::builder()
        .uri("/health")
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_enabled_allows_any_origin() {
    let response = app().oneshot(health_from("http://other.test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_cors_disabled_sends_no_cors_headers() {
    let mut config = test_config();
    config.cors.enabled = false;

    let response = app_with(config)
        .oneshot(health_from("http://other.test"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_openapi_document() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(doc["paths"]["/api/v1/chat"]["post"].is_object());
    assert!(doc["paths"]["/health"]["get"].is_object());
}

#[tokio::test]
async fn test_api_error_response() {
    let response = ApiError::BadRequest("Test error".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ApiError::Internal.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["msg"], "Internal server error");
}
