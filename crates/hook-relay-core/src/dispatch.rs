//! Outbound delivery of formatted messages.
//!
//! Delivery is at-most-once: one send attempt per message, failures are
//! logged and reported as [`DispatchOutcome::Failed`] instead of errors.

use crate::markdown::{truncate_text, TELEGRAM_MESSAGE_LIMIT};
use crate::ChatId;
use async_trait::async_trait;
use std::time::Instant;
use telegram_bot_sdk::{ParseMode, SendMessageRequest, TelegramClient};
use tracing::{error, info, instrument};

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered { message_id: i64 },
    Failed { reason: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Delivers a text message to a chat.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use hook_relay_core::dispatch::{DispatchOutcome, MessageDispatcher};
/// use hook_relay_core::ChatId;
///
/// struct Discard;
///
/// #[async_trait]
/// impl MessageDispatcher for Discard {
///     async fn dispatch(&self, _destination: &ChatId, _text: &str) -> DispatchOutcome {
///         DispatchOutcome::Delivered { message_id: 0 }
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let outcome = Discard.dispatch(&ChatId::new("-100200").unwrap(), "hello").await;
/// assert!(outcome.is_delivered());
/// # });
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Send `text` to `destination`. Never fails; problems are reported in
    /// the returned outcome.
    async fn dispatch(&self, destination: &ChatId, text: &str) -> DispatchOutcome;
}

/// Message rendering options applied to every send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
    pub max_message_length: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            parse_mode: Some(ParseMode::Markdown),
            disable_web_page_preview: true,
            max_message_length: TELEGRAM_MESSAGE_LIMIT,
        }
    }
}

/// Dispatcher backed by the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramDispatcher {
    client: TelegramClient,
    settings: DispatchSettings,
}

impl TelegramDispatcher {
    pub fn new(client: TelegramClient, settings: DispatchSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    fn build_request(&self, destination: &ChatId, text: &str) -> SendMessageRequest {
        let text = truncate_text(text, self.settings.max_message_length);
        let mut request = SendMessageRequest::new(destination.as_str(), text)
            .with_web_page_preview_disabled(self.settings.disable_web_page_preview);
        if let Some(parse_mode) = self.settings.parse_mode {
            request = request.with_parse_mode(parse_mode);
        }
        request
    }
}

#[async_trait]
impl MessageDispatcher for TelegramDispatcher {
    #[instrument(skip(self, text), fields(destination = %destination, length = text.len()))]
    async fn dispatch(&self, destination: &ChatId, text: &str) -> DispatchOutcome {
        if text.trim().is_empty() {
            error!("Refusing to send an empty message");
            return DispatchOutcome::failed("message text is empty");
        }

        let request = self.build_request(destination, text);
        let started = Instant::now();

        match self.client.send_message(&request).await {
            Ok(message) => {
                info!(
                    message_id = message.message_id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Message delivered"
                );
                DispatchOutcome::Delivered {
                    message_id: message.message_id,
                }
            }
            Err(e) => {
                error!(
                    error = %e,
                    transient = e.is_transient(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Failed to deliver message"
                );
                DispatchOutcome::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
