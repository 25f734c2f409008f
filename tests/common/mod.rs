//! Shared helpers: a mock Telegram Bot API and request builders.

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::post,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

use telegram_relay::{AppState, RelayConfig, router};

pub const BOT_TOKEN: &str = "test-token";
pub const CHAT_ID: &str = "-100200300";

/// How the mock answers `sendMessage`.
#[derive(Clone, Copy, Debug)]
#[allow(dead_code)]
pub enum Upstream {
    Accept,
    AcceptWithoutOk,
    RejectInBody,
    HttpError(u16),
    Garbage,
    Slow(Duration),
}

#[derive(Clone)]
struct MockState {
    mode: Upstream,
    received: Arc<Mutex<Vec<Value>>>,
}

pub struct MockTelegram {
    pub base: String,
    pub received: Arc<Mutex<Vec<Value>>>,
}

impl MockTelegram {
    pub fn messages(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

async fn send_message(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.received.lock().unwrap().push(body);

    let (status, payload) = match state.mode {
        Upstream::Accept => (200, r#"{"ok":true,"result":{"message_id":1}}"#),
        Upstream::AcceptWithoutOk => (200, r#"{"result":{"message_id":2}}"#),
        Upstream::RejectInBody => (200, r#"{"ok":false,"description":"Bad Request: chat not found"}"#),
        Upstream::HttpError(code) => (code, r#"{"ok":false,"error_code":403,"description":"Forbidden"}"#),
        Upstream::Garbage => (200, "<html>gateway</html>"),
        Upstream::Slow(delay) => {
            tokio::time::sleep(delay).await;
            (200, r#"{"ok":true}"#)
        }
    };

    Response::builder()
        .status(StatusCode::from_u16(status).unwrap())
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap()
}

pub async fn start_mock_telegram(mode: Upstream) -> MockTelegram {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route(&format!("/bot{}/sendMessage", BOT_TOKEN), post(send_message))
        .with_state(MockState {
            mode,
            received: Arc::clone(&received),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockTelegram {
        base: format!("http://{}", addr),
        received,
    }
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn config(api_base: &str) -> RelayConfig {
    let mut config = RelayConfig::new(BOT_TOKEN, CHAT_ID);
    config.api_base = api_base.to_string();
    config.upstream_timeout = Duration::from_secs(2);
    config
}

pub fn app(config: &RelayConfig) -> Router {
    router(Arc::new(AppState::new(config).unwrap()))
}

pub fn send(uri: &str, client: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
