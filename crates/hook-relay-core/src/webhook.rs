//! Inbound GitHub webhook extraction.
//!
//! Turns raw HTTP headers and body bytes into a [`WebhookEvent`]. No schema is
//! enforced on the payload beyond "a non-empty JSON document".

use crate::payload::Payload;
use crate::{EventType, Timestamp, ValidationError};
use bytes::Bytes;
use std::collections::HashMap;

pub const EVENT_TYPE_HEADER: &str = "X-GitHub-Event";
pub const DELIVERY_ID_HEADER: &str = "X-GitHub-Delivery";

/// GitHub headers relevant to relaying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub event_type: EventType,
    pub delivery_id: Option<String>,
    pub user_agent: Option<String>,
}

impl WebhookHeaders {
    /// Extract headers from a name-to-value map. Header names are matched
    /// case-insensitively.
    pub fn from_http_headers(headers: &HashMap<String, String>) -> Result<Self, ValidationError> {
        let event_type = find_header(headers, EVENT_TYPE_HEADER)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ValidationError::Required {
                field: EVENT_TYPE_HEADER.to_string(),
            })?;
        let event_type = EventType::new(event_type)?;

        let delivery_id = find_header(headers, DELIVERY_ID_HEADER)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        let user_agent = find_header(headers, "User-Agent").map(str::to_string);

        Ok(Self {
            event_type,
            delivery_id,
            user_agent,
        })
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Why a request body cannot be relayed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("No payload")]
    Empty,

    #[error("Payload is not valid JSON: {message}")]
    Malformed { message: String },
}

/// Parse a request body into a payload.
///
/// Empty bodies and the JSON values `null`, `{}` and `[]` count as no payload.
pub fn parse_payload(body: &[u8]) -> Result<Payload, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::Empty);
    }

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| PayloadError::Malformed {
            message: e.to_string(),
        })?;

    let payload = Payload::new(value);
    if payload.is_absent() {
        return Err(PayloadError::Empty);
    }
    Ok(payload)
}

/// Errors extracting a [`WebhookEvent`] from a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid webhook headers: {0}")]
    Headers(#[from] ValidationError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// One upstream notification: event type plus payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    event_type: EventType,
    payload: Payload,
    delivery_id: Option<String>,
    received_at: Timestamp,
}

impl WebhookEvent {
    pub fn new(event_type: EventType, payload: Payload) -> Self {
        Self {
            event_type,
            payload,
            delivery_id: None,
            received_at: Timestamp::now(),
        }
    }

    /// Build an event from raw request parts.
    ///
    /// Headers are checked before the body.
    pub fn from_request(
        headers: &HashMap<String, String>,
        body: &Bytes,
    ) -> Result<Self, WebhookError> {
        let headers = WebhookHeaders::from_http_headers(headers)?;
        let payload = parse_payload(body)?;

        Ok(Self::new(headers.event_type, payload).with_delivery_id(headers.delivery_id))
    }

    pub fn with_delivery_id(mut self, delivery_id: Option<String>) -> Self {
        self.delivery_id = delivery_id;
        self
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn delivery_id(&self) -> Option<&str> {
        self.delivery_id.as_deref()
    }

    pub fn received_at(&self) -> Timestamp {
        self.received_at
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
