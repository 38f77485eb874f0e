//! Request and response models for the Telegram Bot API.
//!
//! Only the fields Hook-Relay reads or writes are modelled. Unknown fields in
//! responses are ignored so that API additions never break deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Response envelope
// ============================================================================

/// Envelope wrapping every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra information attached to failed responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before repeating the request (flood control).
    pub retry_after: Option<u64>,

    /// The group was migrated to a supergroup with this id.
    pub migrate_to_chat_id: Option<i64>,
}

// ============================================================================
// Formatting options
// ============================================================================

/// Markup mode the API uses to interpret message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParseMode {
    /// Legacy Markdown (`*bold*`, `_italic_`, `[text](url)`).
    #[default]
    #[serde(rename = "Markdown")]
    Markdown,

    #[serde(rename = "MarkdownV2")]
    MarkdownV2,

    #[serde(rename = "HTML")]
    Html,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Markdown => "Markdown",
            Self::MarkdownV2 => "MarkdownV2",
            Self::Html => "HTML",
        };
        f.write_str(value)
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" => Ok(Self::Markdown),
            "markdownv2" => Ok(Self::MarkdownV2),
            "html" => Ok(Self::Html),
            other => Err(format!("Unknown parse mode: {}", other)),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessageRequest {
    /// Numeric chat id or `@channelusername`.
    pub chat_id: String,

    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl SendMessageRequest {
    /// Create a plain-text message request.
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            disable_web_page_preview: None,
            reply_to_message_id: None,
        }
    }

    /// Ask the API to interpret markup in the text.
    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    /// Control link previews for URLs in the text.
    pub fn with_web_page_preview_disabled(mut self, disabled: bool) -> Self {
        self.disable_web_page_preview = Some(disabled);
        self
    }

    /// Send the message as a reply to an existing message.
    pub fn in_reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

/// Body of a `getUpdates` long-poll call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Long-poll timeout in seconds.
    pub timeout: u64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_updates: Vec<String>,
}

/// Body of a `setWebhook` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetWebhookRequest {
    pub url: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_updates: Vec<String>,
}

// ============================================================================
// Updates and messages
// ============================================================================

/// Incoming update delivered by webhook or `getUpdates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,
}

impl Update {
    /// The new message carried by this update, from a chat or a channel.
    ///
    /// Edits are not considered: re-running a command because its message was
    /// edited would answer twice.
    pub fn effective_message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.channel_post.as_ref())
    }
}

/// One entry of a `getUpdates` batch.
///
/// Entries that do not decode as an [`Update`] keep whatever id they carry,
/// so a poller can still move its offset past them.
#[derive(Debug, Clone, PartialEq)]
pub enum PolledUpdate {
    Decoded(Update),
    Undecodable {
        update_id: Option<i64>,
        reason: String,
    },
}

impl PolledUpdate {
    pub fn from_value(value: serde_json::Value) -> Self {
        let update_id = value.get("update_id").and_then(serde_json::Value::as_i64);
        match serde_json::from_value::<Update>(value) {
            Ok(update) => Self::Decoded(update),
            Err(e) => Self::Undecodable {
                update_id,
                reason: e.to_string(),
            },
        }
    }

    pub fn update_id(&self) -> Option<i64> {
        match self {
            Self::Decoded(update) => Some(update.update_id),
            Self::Undecodable { update_id, .. } => *update_id,
        }
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,

    pub chat: Chat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,

    #[serde(default)]
    pub date: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A private chat, group, supergroup or channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,

    #[serde(rename = "type")]
    pub chat_type: ChatType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Kind of chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Supergroup => "supergroup",
            Self::Channel => "channel",
            Self::Unknown => "unknown",
        };
        f.write_str(value)
    }
}

/// A Telegram user or bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub is_bot: bool,

    #[serde(default)]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
