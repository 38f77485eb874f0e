//! Common test utilities and fixtures for integration tests

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use bytes::Bytes;
use hook_relay_api::{create_router, AppState, ServiceConfig};
use hook_relay_core::dispatch::{DispatchOutcome, MessageDispatcher};
use hook_relay_core::ChatId;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const DEFAULT_CHAT: &str = "-100200";
pub const ISSUE_CHAT: &str = "-100300";
pub const BOT_USERNAME: &str = "relay_bot";

/// A message handed to the dispatcher.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub text: String,
}

/// Dispatcher that records every message and answers with a fixed outcome.
#[allow(dead_code)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<SentMessage>>,
    outcome: DispatchOutcome,
}

#[allow(dead_code)]
impl RecordingDispatcher {
    pub fn delivering() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            outcome: DispatchOutcome::Delivered { message_id: 1 },
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            outcome: DispatchOutcome::Failed {
                reason: reason.to_string(),
            },
        })
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageDispatcher for RecordingDispatcher {
    async fn dispatch(&self, destination: &ChatId, text: &str) -> DispatchOutcome {
        self.sent.lock().unwrap().push(SentMessage {
            chat_id: destination.as_str().to_string(),
            text: text.to_string(),
        });
        self.outcome.clone()
    }
}

/// Configuration with issue events mapped to [`ISSUE_CHAT`] and everything
/// else falling back to [`DEFAULT_CHAT`].
#[allow(dead_code)]
pub fn create_test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.telegram.bot_token = "123456:TEST-TOKEN".to_string();
    config.telegram.bot_username = Some(BOT_USERNAME.to_string());
    config.telegram.default_chat_id = DEFAULT_CHAT.to_string();
    config.routing.event_chat_mapping = Some(format!(
        r#"{{"issues,issue_comment": "{}"}}"#,
        ISSUE_CHAT
    ));
    config
}

#[allow(dead_code)]
pub fn create_test_app_state(dispatcher: Arc<dyn MessageDispatcher>) -> AppState {
    create_test_app_state_with_config(create_test_config(), dispatcher)
}

#[allow(dead_code)]
pub fn create_test_app_state_with_config(
    config: ServiceConfig,
    dispatcher: Arc<dyn MessageDispatcher>,
) -> AppState {
    AppState::from_config(config, dispatcher).expect("test configuration should be valid")
}

/// Headers GitHub sends with a webhook delivery.
#[allow(dead_code)]
pub fn create_webhook_headers(event_type: &str) -> axum::http::HeaderMap {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert("x-github-event", event_type.parse().unwrap());
    headers.insert(
        "x-github-delivery",
        "72d3162e-cc78-11e3-81ab-4c9367dc0958".parse().unwrap(),
    );
    headers.insert("content-type", "application/json".parse().unwrap());
    headers.insert("user-agent", "GitHub-Hookshot/abc123".parse().unwrap());
    headers
}

#[allow(dead_code)]
pub fn json_body(value: &Value) -> Bytes {
    Bytes::from(serde_json::to_vec(value).unwrap())
}

/// POST a webhook through the full router.
#[allow(dead_code)]
pub async fn post_webhook(app: Router, event_type: &str, body: &Value) -> (u16, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("x-github-event", event_type)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// POST a bot update through the full router.
#[allow(dead_code)]
pub async fn post_telegram_update(app: Router, update: &Value) -> (u16, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/telegram-webhook")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(update).unwrap()))
        .unwrap();
    send(app, request).await
}

#[allow(dead_code)]
pub fn create_test_router(state: AppState) -> Router {
    create_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (u16, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Payload fixtures
// ============================================================================

#[allow(dead_code)]
pub fn ping_payload() -> Value {
    json!({
        "zen": "Keep it logically awesome.",
        "hook_id": 42,
        "repository": { "full_name": "octo/relay" }
    })
}

#[allow(dead_code)]
pub fn issue_payload(action: &str) -> Value {
    json!({
        "action": action,
        "issue": {
            "number": 7,
            "title": "Crash on startup",
            "html_url": "https://github.com/octo/relay/issues/7",
            "body": "Steps to reproduce",
            "user": { "login": "alice" }
        },
        "repository": { "full_name": "octo/relay" }
    })
}

#[allow(dead_code)]
pub fn pull_request_payload(action: &str, merged: bool) -> Value {
    json!({
        "action": action,
        "pull_request": {
            "number": 12,
            "title": "Add retries",
            "html_url": "https://github.com/octo/relay/pull/12",
            "body": "Retries failed sends",
            "merged": merged,
            "user": { "login": "bob" }
        },
        "repository": { "full_name": "octo/relay" }
    })
}

#[allow(dead_code)]
pub fn push_payload() -> Value {
    json!({
        "ref": "refs/heads/main",
        "pusher": { "name": "carol" },
        "commits": [
            {
                "id": "0123456789abcdef",
                "message": "Fix build\n\nDetails",
                "url": "https://github.com/octo/relay/commit/0123456"
            }
        ],
        "repository": { "full_name": "octo/relay" }
    })
}

/// A bot update carrying a text message from a group chat.
#[allow(dead_code)]
pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": 10,
            "chat": { "id": chat_id, "type": "group", "title": "Ops" },
            "text": text
        }
    })
}
