use super::*;
use serde_json::json;
use telegram_bot_sdk::{BotToken, ClientConfig};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_TOKEN: &str = "42:DISPATCH-TOKEN";

fn dispatcher(server: &MockServer, settings: DispatchSettings) -> TelegramDispatcher {
    let config = ClientConfig::default().with_api_url(server.uri());
    let client = TelegramClient::new(BotToken::new(TEST_TOKEN).unwrap(), config).unwrap();
    TelegramDispatcher::new(client, settings)
}

fn chat() -> ChatId {
    ChatId::new("-100777").unwrap()
}

fn sent_message(message_id: i64) -> serde_json::Value {
    json!({
        "ok": true,
        "result": {
            "message_id": message_id,
            "chat": { "id": -100777, "type": "supergroup" },
            "date": 1700000000
        }
    })
}

#[tokio::test]
async fn test_dispatch_sends_markdown_without_previews() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TEST_TOKEN)))
        .and(body_partial_json(json!({
            "chat_id": "-100777",
            "text": "*hello*",
            "parse_mode": "Markdown",
            "disable_web_page_preview": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(11)))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = dispatcher(&server, DispatchSettings::default())
        .dispatch(&chat(), "*hello*")
        .await;

    assert_eq!(outcome, DispatchOutcome::Delivered { message_id: 11 });
}

#[tokio::test]
async fn test_dispatch_truncates_long_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TEST_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(12)))
        .mount(&server)
        .await;

    let outcome = dispatcher(&server, DispatchSettings::default())
        .dispatch(&chat(), &"z".repeat(5000))
        .await;
    assert!(outcome.is_delivered());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert_eq!(text.chars().count(), TELEGRAM_MESSAGE_LIMIT);
    assert!(text.ends_with("..."));
}

#[tokio::test]
async fn test_dispatch_without_parse_mode_omits_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TEST_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(13)))
        .mount(&server)
        .await;

    let settings = DispatchSettings {
        parse_mode: None,
        disable_web_page_preview: false,
        ..DispatchSettings::default()
    };
    dispatcher(&server, settings).dispatch(&chat(), "plain").await;

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("parse_mode").is_none());
    assert_eq!(body["disable_web_page_preview"], json!(false));
}

#[tokio::test]
async fn test_api_errors_become_failed_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TEST_TOKEN)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = dispatcher(&server, DispatchSettings::default())
        .dispatch(&chat(), "hello")
        .await;

    match outcome {
        DispatchOutcome::Failed { reason } => assert!(reason.contains("chat not found")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_errors_become_failed_outcomes() {
    let config = ClientConfig::default()
        .with_api_url("http://127.0.0.1:9")
        .with_timeout(std::time::Duration::from_secs(2));
    let client = TelegramClient::new(BotToken::new(TEST_TOKEN).unwrap(), config).unwrap();
    let dispatcher = TelegramDispatcher::new(client, DispatchSettings::default());

    let outcome = dispatcher.dispatch(&chat(), "hello").await;

    match outcome {
        DispatchOutcome::Failed { reason } => assert!(!reason.contains(TEST_TOKEN)),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_text_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(1)))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = dispatcher(&server, DispatchSettings::default())
        .dispatch(&chat(), "   ")
        .await;

    assert!(!outcome.is_delivered());
}
