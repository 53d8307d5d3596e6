use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chat_widget::reply::{HttpReplySource, ReplyError, ReplySource, SimulatedReplySource};
use chat_widget::server::{ServerState, router};
use chat_widget::session::{ChatSessionController, SessionSettings, SessionTexts, SubmitOutcome};
use chat_widget::ui::{MemoryInput, MemorySurface};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Responder that always fails.
#[derive(Debug)]
struct BrokenResponder;

#[async_trait]
impl ReplySource for BrokenResponder {
    async fn obtain_reply(&self, _message: &str) -> Result<Option<String>, ReplyError> {
        Err(ReplyError::Unavailable("model not loaded".into()))
    }
}

/// Responder that pads its answer with whitespace.
#[derive(Debug)]
struct PaddedResponder;

#[async_trait]
impl ReplySource for PaddedResponder {
    async fn obtain_reply(&self, message: &str) -> Result<Option<String>, ReplyError> {
        Ok(Some(format!("  echo: {message}\n")))
    }
}

fn test_server(responder: Arc<dyn ReplySource>) -> TestServer {
    let app = router(ServerState { responder }, Duration::from_secs(5));
    TestServer::new(app).expect("Failed to start test server")
}

/// Serve the router on an ephemeral port and return the `/chat` URL.
async fn spawn_server(responder: Arc<dyn ReplySource>) -> String {
    let app = router(ServerState { responder }, Duration::from_secs(5));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/chat")
}

#[tokio::test]
async fn test_chat_replies_with_keyword_answer() {
    let server = test_server(Arc::new(SimulatedReplySource::instant()));

    let response = server
        .post("/chat")
        .json(&json!({ "message": "How are you?" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["reply"], "I'm just code, but I'm doing fine!");
}

#[tokio::test]
async fn test_reply_is_trimmed() {
    let server = test_server(Arc::new(PaddedResponder));

    let response = server.post("/chat").json(&json!({ "message": "  hi  " })).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["reply"], "echo: hi");
}

#[tokio::test]
async fn test_missing_message_is_bad_request() {
    let server = test_server(Arc::new(SimulatedReplySource::instant()));

    let response = server.post("/chat").json(&json!({ "text": "hello" })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "JSON body must contain 'message'");
}

#[tokio::test]
async fn test_non_json_body_is_bad_request() {
    let server = test_server(Arc::new(SimulatedReplySource::instant()));

    let response = server.post("/chat").text("hello").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_message_is_bad_request() {
    let server = test_server(Arc::new(SimulatedReplySource::instant()));

    let response = server.post("/chat").json(&json!({ "message": "   " })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Empty message");
}

#[tokio::test]
async fn test_responder_failure_is_internal_error() {
    let server = test_server(Arc::new(BrokenResponder));

    let response = server.post("/chat").json(&json!({ "message": "hello" })).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_http_source_against_live_endpoint() {
    let endpoint = spawn_server(Arc::new(SimulatedReplySource::instant())).await;
    let source = HttpReplySource::new(&endpoint).unwrap();

    let reply = source.obtain_reply("hello").await.unwrap();

    assert_eq!(reply.as_deref(), Some("testt"));
}

#[tokio::test]
async fn test_http_source_reports_error_status() {
    let endpoint = spawn_server(Arc::new(BrokenResponder)).await;
    let source = HttpReplySource::new(&endpoint).unwrap();

    let err = source.obtain_reply("hello").await.unwrap_err();

    assert!(matches!(err, ReplyError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_http_source_reports_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpReplySource::new(format!("http://{addr}/chat")).unwrap();
    let err = source.obtain_reply("hello").await.unwrap_err();

    assert!(matches!(err, ReplyError::Transport(_)));
}

/// Serve a `/chat` route that answers 200 with `body` and return its URL.
async fn spawn_raw_endpoint(body: &'static str) -> String {
    let app = axum::Router::new().route("/chat", axum::routing::post(move || async move { body }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/chat")
}

#[tokio::test]
async fn test_http_source_reports_malformed_body() {
    for body in ["not json", r#"{"reply": 5}"#] {
        let endpoint = spawn_raw_endpoint(body).await;
        let source = HttpReplySource::new(&endpoint).unwrap();

        let err = source.obtain_reply("hello").await.unwrap_err();

        assert!(matches!(err, ReplyError::Decode(_)), "body {body:?} gave {err:?}");
    }
}

#[tokio::test]
async fn test_controller_apologizes_on_malformed_reply() {
    let endpoint = spawn_raw_endpoint("not json").await;
    let surface = MemorySurface::new();
    let controller = ChatSessionController::new(
        Arc::new(surface.clone()),
        Arc::new(MemoryInput::new()),
        Arc::new(HttpReplySource::new(&endpoint).unwrap()),
        SessionSettings::default(),
    );

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Failed);
    assert_eq!(surface.texts(), vec!["hello".to_string(), SessionTexts::default().apology]);
}

#[tokio::test]
async fn test_controller_end_to_end_over_http() {
    let endpoint = spawn_server(Arc::new(SimulatedReplySource::instant())).await;
    let surface = MemorySurface::new();
    let input = MemoryInput::new();
    let controller = ChatSessionController::new(
        Arc::new(surface.clone()),
        Arc::new(input.clone()),
        Arc::new(HttpReplySource::new(&endpoint).unwrap()),
        SessionSettings {
            track_latency: true,
            ..SessionSettings::default()
        },
    );

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Replied);
    assert_eq!(surface.texts(), vec!["hello", "testt"]);
    assert!(surface.status().unwrap().starts_with("Response time: "));
}

#[tokio::test]
async fn test_controller_apologizes_when_server_fails() {
    let endpoint = spawn_server(Arc::new(BrokenResponder)).await;
    let surface = MemorySurface::new();
    let controller = ChatSessionController::new(
        Arc::new(surface.clone()),
        Arc::new(MemoryInput::new()),
        Arc::new(HttpReplySource::new(&endpoint).unwrap()),
        SessionSettings::default(),
    );

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Failed);
    assert_eq!(surface.texts()[1], SessionTexts::default().apology);
}
