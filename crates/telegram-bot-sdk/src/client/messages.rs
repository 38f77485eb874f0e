//! Message operations.

use tracing::debug;

use super::TelegramClient;
use crate::error::ApiError;
use crate::types::{Message, SendMessageRequest};

impl TelegramClient {
    /// Send a text message to a chat.
    ///
    /// # Errors
    ///
    /// - `ApiError::InvalidRequest` if the chat id or text is empty
    /// - `ApiError::Api` if the API rejects the message (unknown chat,
    ///   markup that cannot be parsed, flood control, ...)
    /// - `ApiError::Network` / `ApiError::Timeout` on transport failures
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<Message, ApiError> {
        if request.chat_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest {
                message: "chat_id must not be empty".to_string(),
            });
        }

        if request.text.is_empty() {
            return Err(ApiError::InvalidRequest {
                message: "text must not be empty".to_string(),
            });
        }

        let message: Message = self.call("sendMessage", request).await?;
        debug!(
            chat_id = message.chat.id,
            message_id = message.message_id,
            "Message sent"
        );

        Ok(message)
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
