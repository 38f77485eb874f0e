//! # Hook-Relay Core
//!
//! Core logic for relaying GitHub webhook events into Telegram chats.
//!
//! This crate turns an incoming event into a chat message and decides where it
//! goes:
//! - [`payload`]: safe, never-failing lookups into arbitrary JSON payloads
//! - [`formatter`]: per-event-type message templates behind a registry
//! - [`routing`]: event type to formatter and destination chat resolution
//! - [`dispatch`]: delivery of formatted messages to the chat platform
//! - [`commands`]: bot commands received from the chat platform
//! - [`webhook`]: header and body extraction for inbound webhooks
//!
//! ## Usage
//!
//! ```rust
//! use hook_relay_core::{ChatId, EventType};
//! use hook_relay_core::formatter::FormatterRegistry;
//! use hook_relay_core::routing::{DestinationMap, EventRouter, RoutingDecision};
//! use hook_relay_core::webhook::WebhookEvent;
//! use hook_relay_core::payload::Payload;
//!
//! let destinations = DestinationMap::builder()
//!     .default_destination(ChatId::new("-100200").unwrap())
//!     .build();
//! let router = EventRouter::new(FormatterRegistry::with_default_formatters(), destinations);
//!
//! let event = WebhookEvent::new(
//!     EventType::new("ping").unwrap(),
//!     Payload::new(serde_json::json!({ "zen": "Keep it logically awesome.", "hook_id": 7 })),
//! );
//!
//! match router.route(&event) {
//!     RoutingDecision::Deliver(delivery) => assert_eq!(delivery.destination.as_str(), "-100200"),
//!     RoutingDecision::Ignored(reason) => panic!("unexpected: {}", reason),
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod commands;
pub mod dispatch;
pub mod formatter;
pub mod markdown;
pub mod payload;
pub mod routing;
pub mod webhook;

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// GitHub event type taken from the `X-GitHub-Event` header, e.g. `push`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct EventType(String);

impl EventType {
    /// Create an event type, rejecting empty or whitespace-only values.
    ///
    /// Surrounding whitespace is trimmed.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(ValidationError::Required {
                field: "event_type".to_string(),
            });
        }

        if value.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidCharacters {
                field: "event_type".to_string(),
                invalid_chars: "whitespace".to_string(),
            });
        }

        Ok(Self(value.to_string()))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EventType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Destination chat identifier.
///
/// Either a numeric chat id (`-1001234567890` for supergroups and channels,
/// positive for private chats) or a public channel username (`@channel`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct ChatId(String);

impl ChatId {
    /// Create a chat id with validation.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(ValidationError::Required {
                field: "chat_id".to_string(),
            });
        }

        let is_numeric = value.parse::<i64>().is_ok();
        let is_username = value.len() > 1
            && value.starts_with('@')
            && value[1..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !is_numeric && !is_username {
            return Err(ValidationError::InvalidFormat {
                field: "chat_id".to_string(),
                message: format!(
                    "'{}' is neither a numeric chat id nor an @username",
                    value
                ),
            });
        }

        Ok(Self(value.to_string()))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChatId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChatId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ============================================================================
// Time Types
// ============================================================================

/// UTC timestamp used in API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current moment
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Convert to RFC3339 string
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Input validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' has invalid format: {message}")]
    InvalidFormat { field: String, message: String },

    #[error("Field '{field}' contains invalid characters: {invalid_chars}")]
    InvalidCharacters {
        field: String,
        invalid_chars: String,
    },
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
