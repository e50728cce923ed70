use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use lfa_insights::ai_gateway::{
    adapters::{GenerationBackend, gemini::GeminiBackend},
    credentials::SnapshotCredentialProvider,
    error::GatewayErrorKind,
    gateway::InsightGateway,
    types::{AIGatewayConfig, BackendContext, CredentialRef, ResolvedCredential},
};

#[derive(Debug, Clone)]
struct SeenRequest {
    model_path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct MockState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn generate_content(
    State(state): State<MockState>,
    Path(model_path): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.seen.lock().expect("seen lock").push(SeenRequest {
        model_path: model_path.clone(),
        api_key: api_key.clone(),
        body,
    });

    if api_key.as_deref() == Some("bad-key") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{"reason": "API_KEY_INVALID"}]
                }
            })),
        )
            .into_response();
    }

    match model_path.as_str() {
        "good-model:generateContent" => Json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "### Strengths\nSolid."}]}}]
        }))
        .into_response(),
        "empty-model:generateContent" => Json(json!({
            "candidates": [{"content": {"role": "model", "parts": []}}]
        }))
        .into_response(),
        "missing-model:generateContent" => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {"code": 404, "message": "model not found", "status": "NOT_FOUND"}
            })),
        )
            .into_response(),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response(),
    }
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/v1beta/models/{model_path}", post(generate_content))
        .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("mock listener should bind");
    let addr = listener.local_addr().expect("mock address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/v1beta", addr), state)
}

fn ctx(endpoint: &str, model: &str, api_key: &str) -> BackendContext {
    BackendContext {
        request_id: "req-gemini".to_string(),
        model: model.to_string(),
        endpoint: endpoint.to_string(),
        credential: ResolvedCredential::api_key(api_key),
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn given_successful_response_when_generate_then_text_and_request_shape_match() {
    let (endpoint, state) = spawn_mock().await;
    let backend = GeminiBackend::new().expect("backend should build");

    let text = backend
        .generate(ctx(&endpoint, "good-model", "good-key"), "Review this LFA")
        .await
        .expect("good model should answer");

    assert_eq!(text, "### Strengths\nSolid.");
    let seen = state.seen.lock().expect("seen lock").clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].model_path, "good-model:generateContent");
    assert_eq!(seen[0].api_key.as_deref(), Some("good-key"));
    assert_eq!(
        seen[0].body["contents"][0]["parts"][0]["text"],
        "Review this LFA"
    );
}

#[tokio::test]
async fn given_invalid_key_response_when_generate_then_authentication_error_is_returned() {
    let (endpoint, _state) = spawn_mock().await;
    let backend = GeminiBackend::new().expect("backend should build");

    let err = backend
        .generate(ctx(&endpoint, "good-model", "bad-key"), "prompt")
        .await
        .expect_err("bad key must fail");

    assert_eq!(err.kind, GatewayErrorKind::Authentication);
    assert_eq!(err.provider_code.as_deref(), Some("API_KEY_INVALID"));
    assert_eq!(err.provider_http_status, Some(400));
}

#[tokio::test]
async fn given_unknown_model_when_generate_then_invalid_request_is_returned() {
    let (endpoint, _state) = spawn_mock().await;
    let backend = GeminiBackend::new().expect("backend should build");

    let err = backend
        .generate(ctx(&endpoint, "missing-model", "good-key"), "prompt")
        .await
        .expect_err("missing model must fail");

    assert_eq!(err.kind, GatewayErrorKind::InvalidRequest);
    assert_eq!(err.model.as_deref(), Some("missing-model"));
}

#[tokio::test]
async fn given_unreachable_endpoint_when_generate_then_transient_error_is_returned() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);

    let backend = GeminiBackend::new().expect("backend should build");
    let err = backend
        .generate(ctx(&format!("http://{}", addr), "good-model", "k"), "prompt")
        .await
        .expect_err("closed port must fail");

    assert_eq!(err.kind, GatewayErrorKind::BackendTransient);
}

#[tokio::test]
async fn given_real_backend_when_gateway_falls_back_then_first_non_empty_model_wins() {
    let (endpoint, state) = spawn_mock().await;
    let config = AIGatewayConfig {
        endpoint,
        credential: CredentialRef::InlineToken {
            token: "good-key".to_string(),
        },
        candidates: vec![
            "busy-model".to_string(),
            "empty-model".to_string(),
            "good-model".to_string(),
        ],
        ..AIGatewayConfig::default()
    };
    let credentials = SnapshotCredentialProvider::capture(&config.credential);
    let gateway = InsightGateway::new(
        config,
        Arc::new(credentials),
        Arc::new(GeminiBackend::new().expect("backend should build")),
    );

    let generation = gateway.generate("prompt").await.expect("good-model answers");

    assert_eq!(generation.model, "good-model");
    let paths = state
        .seen
        .lock()
        .expect("seen lock")
        .iter()
        .map(|seen| seen.model_path.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![
            "busy-model:generateContent",
            "empty-model:generateContent",
            "good-model:generateContent"
        ]
    );
}

#[tokio::test]
async fn given_rejected_key_when_gateway_runs_then_remaining_models_are_skipped() {
    let (endpoint, state) = spawn_mock().await;
    let config = AIGatewayConfig {
        endpoint,
        credential: CredentialRef::InlineToken {
            token: "bad-key".to_string(),
        },
        candidates: vec!["good-model".to_string(), "busy-model".to_string()],
        ..AIGatewayConfig::default()
    };
    let credentials = SnapshotCredentialProvider::capture(&config.credential);
    let gateway = InsightGateway::new(
        config,
        Arc::new(credentials),
        Arc::new(GeminiBackend::new().expect("backend should build")),
    );

    let err = gateway.generate("prompt").await.expect_err("bad key is terminal");

    assert_eq!(err.kind, GatewayErrorKind::Authentication);
    assert_eq!(state.seen.lock().expect("seen lock").len(), 1);
}
