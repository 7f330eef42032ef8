use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use door_core::{build_backend, AiBackendConfig, ChatBackend, DoorError, ErrorKind};
use riddle_rules::ChatMessage;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Clone)]
struct TestState {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn completions(
    State(state): State<TestState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.seen.lock().await.push((headers, body));
    (state.status, state.body.clone())
}

async fn serve(status: StatusCode, body: impl Into<String>) -> (SocketAddr, TestState) {
    let state = TestState {
        status,
        body: body.into(),
        seen: Arc::default(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn vllm_config(addr: SocketAddr, api_key: &str) -> AiBackendConfig {
    let mut config = AiBackendConfig::default();
    config.temperature = 0.25;
    config.vllm.base_url = format!("http://{addr}");
    config.vllm.api_key = api_key.to_string();
    config.vllm.model = "test-model".to_string();
    config
}

fn openai_config(addr: SocketAddr) -> AiBackendConfig {
    let mut config = AiBackendConfig::default();
    config.set_use_open_ai(true);
    config.open_ai.url = format!("http://{addr}/v1/chat/completions");
    config.open_ai.api_key = "sk-test".to_string();
    config
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a door."),
        ChatMessage::assistant("   "),
        ChatMessage::user("Open up!"),
    ]
}

#[tokio::test]
async fn test_vllm_request_shape_and_last_content() {
    let body = json!({
        "choices": [
            {"message": {"role": "assistant", "content": "first candidate"}},
            {"message": {"role": "assistant", "content": "Caf\u{e9}? \"Never\".\nTry again."}}
        ]
    })
    .to_string();
    let (addr, state) = serve(StatusCode::OK, body).await;

    let backend = build_backend(&vllm_config(addr, "secret")).unwrap();
    assert_eq!(backend.provider(), "vLLM");

    let reply = backend.chat_once(&conversation()).await.unwrap();
    assert_eq!(reply, "Café? \"Never\".\nTry again.");

    let seen = state.seen.lock().await;
    assert_eq!(seen.len(), 1);
    let (headers, request) = &seen[0];
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::AUTHORIZATION], "Bearer secret");

    assert_eq!(request["model"], "test-model");
    assert_eq!(request["stream"], false);
    let temperature = request["temperature"].as_f64().unwrap();
    assert!((temperature - 0.25).abs() < 1e-6);
    assert_eq!(
        request["messages"],
        json!([
            {"role": "system", "content": "You are a door."},
            {"role": "user", "content": "Open up!"}
        ])
    );
}

#[tokio::test]
async fn test_no_authorization_without_key() {
    let (addr, state) = serve(StatusCode::OK, r#"{"content":"ok"}"#).await;
    let backend = build_backend(&vllm_config(addr, "  ")).unwrap();

    assert_eq!(backend.chat_once(&conversation()).await.unwrap(), "ok");
    let seen = state.seen.lock().await;
    assert!(seen[0].0.get(header::AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_error_status_carries_bounded_body() {
    let long_body = "x".repeat(5000);
    let (addr, _) = serve(StatusCode::SERVICE_UNAVAILABLE, long_body).await;
    let backend = build_backend(&vllm_config(addr, "")).unwrap();

    let err = backend.chat_once(&conversation()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    match &err {
        DoorError::Transport {
            provider,
            status,
            detail,
        } => {
            assert_eq!(*provider, "vLLM");
            assert_eq!(*status, Some(503));
            assert_eq!(detail.chars().count(), 1203);
            assert!(detail.ends_with("..."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("vLLM HTTP 503: xxx"));
}

#[tokio::test]
async fn test_missing_content_is_a_parse_failure() {
    let (addr, _) = serve(StatusCode::OK, r#"{"choices":[{"message":{"content":null}}]}"#).await;
    let backend = build_backend(&vllm_config(addr, "")).unwrap();

    let err = backend.chat_once(&conversation()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.to_string(), "vLLM response parse failed.");
}

#[tokio::test]
async fn test_openai_uses_configured_url() {
    let (addr, state) = serve(
        StatusCode::OK,
        r#"{"choices":[{"message":{"role":"assistant","content":"Hello, traveler."}}]}"#,
    )
    .await;
    let backend = build_backend(&openai_config(addr)).unwrap();
    assert_eq!(backend.provider(), "OpenAI");

    assert_eq!(
        backend.chat_once(&conversation()).await.unwrap(),
        "Hello, traveler."
    );
    let seen = state.seen.lock().await;
    assert_eq!(seen[0].1["model"], "gpt-4o-mini");
    assert_eq!(seen[0].0[header::AUTHORIZATION], "Bearer sk-test");
}

#[tokio::test]
async fn test_openai_unauthorized() {
    let (addr, _) = serve(StatusCode::UNAUTHORIZED, r#"{"error":"bad key"}"#).await;
    let backend = build_backend(&openai_config(addr)).unwrap();

    let err = backend.chat_once(&conversation()).await.unwrap_err();
    assert_eq!(err.to_string(), r#"OpenAI HTTP 401: {"error":"bad key"}"#);
}

#[tokio::test]
async fn test_empty_conversation_sends_nothing() {
    let (addr, state) = serve(StatusCode::OK, r#"{"content":"ok"}"#).await;
    let backend = build_backend(&vllm_config(addr, "")).unwrap();

    let err = backend
        .chat_once(&[ChatMessage::user(""), ChatMessage::system(" \n")])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "vLLM: no messages provided.");
    assert!(state.seen.lock().await.is_empty());
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = build_backend(&vllm_config(addr, "")).unwrap();
    let err = backend.chat_once(&conversation()).await.unwrap_err();
    assert!(matches!(
        err,
        DoorError::Transport {
            provider: "vLLM",
            status: None,
            ..
        }
    ));
}
