//! Message formatting for webhook events.
//!
//! Each supported event type has a pure formatter turning the payload into a
//! chat message, or into nothing when the action is not worth relaying. The
//! [`FormatterRegistry`] is the single dispatch table from event type to
//! formatter.

use crate::markdown::{bold_safe, code_span_safe, truncate_text, TELEGRAM_MESSAGE_LIMIT};
use crate::payload::Payload;
use crate::EventType;
use std::collections::HashMap;
use tracing::{debug, warn};

pub mod events;

/// Formatter signature shared by every event type.
///
/// `Ok(None)` means the event is valid but should not produce a notification.
pub type FormatterFn = fn(&Payload) -> Result<Option<String>, FormatError>;

/// Payload shapes a formatter cannot work with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Payload must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Payload is missing the '{section}' section")]
    MissingSection { section: String },
}

impl FormatError {
    pub(crate) fn missing(section: &str) -> Self {
        Self::MissingSection {
            section: section.to_string(),
        }
    }
}

/// Result of running an event through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// A notification should be sent.
    Message(String),
    /// The event type is known but this payload produces no notification.
    NoMessage,
    /// No formatter handles this event type.
    Unregistered,
}

/// Event type to formatter dispatch table.
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, FormatterFn>,
    forward_unknown_events: bool,
}

impl FormatterRegistry {
    /// Registry without any formatters.
    pub fn new() -> Self {
        Self {
            formatters: HashMap::new(),
            forward_unknown_events: false,
        }
    }

    /// Registry with a formatter for every built-in event type.
    pub fn with_default_formatters() -> Self {
        let mut registry = Self::new();
        for (event_type, formatter) in events::DEFAULT_FORMATTERS {
            registry.register(event_type, *formatter);
        }
        registry
    }

    /// Render unregistered event types with the generic formatter instead of
    /// ignoring them.
    pub fn with_unknown_event_forwarding(mut self, enabled: bool) -> Self {
        self.forward_unknown_events = enabled;
        self
    }

    /// Add or replace the formatter for `event_type`.
    ///
    /// Returns the formatter previously registered, if any.
    pub fn register(&mut self, event_type: &str, formatter: FormatterFn) -> Option<FormatterFn> {
        self.formatters.insert(event_type.to_string(), formatter)
    }

    pub fn contains(&self, event_type: &EventType) -> bool {
        self.formatters.contains_key(event_type.as_str())
    }

    pub fn forwards_unknown_events(&self) -> bool {
        self.forward_unknown_events
    }

    /// Registered event types in sorted order.
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Format `payload` as an `event_type` notification.
    ///
    /// Formatting errors are logged and reported as [`FormatOutcome::NoMessage`].
    pub fn format(&self, event_type: &EventType, payload: &Payload) -> FormatOutcome {
        let result = match self.formatters.get(event_type.as_str()) {
            Some(formatter) => formatter(payload),
            None if self.forward_unknown_events => format_unknown_event(event_type, payload),
            None => return FormatOutcome::Unregistered,
        };

        match result {
            Ok(Some(message)) => FormatOutcome::Message(message),
            Ok(None) => {
                debug!(event_type = %event_type, "Formatter produced no message");
                FormatOutcome::NoMessage
            }
            Err(error) => {
                warn!(
                    event_type = %event_type,
                    error = %error,
                    "Failed to format webhook payload"
                );
                FormatOutcome::NoMessage
            }
        }
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::with_default_formatters()
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("event_types", &self.event_types())
            .field("forward_unknown_events", &self.forward_unknown_events)
            .finish()
    }
}

/// Room left for the payload dump once the header and code fences are added.
const UNKNOWN_EVENT_DUMP_LIMIT: usize = TELEGRAM_MESSAGE_LIMIT - 512;

/// Generic rendering for event types without a dedicated formatter.
pub fn format_unknown_event(
    event_type: &EventType,
    payload: &Payload,
) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let repository = payload.text_or_unknown("repository.full_name");
    let dump = serde_json::to_string_pretty(payload.as_value())
        .unwrap_or_else(|_| payload.as_value().to_string());

    Ok(Some(format!(
        "📦 *GitHub event in {}*\n*Event:* `{}`\n```\n{}\n```",
        bold_safe(&repository),
        code_span_safe(event_type.as_str()),
        truncate_text(&dump.replace("```", "'''"), UNKNOWN_EVENT_DUMP_LIMIT)
    )))
}

pub(crate) fn ensure_object(payload: &Payload) -> Result<(), FormatError> {
    if payload.is_object() {
        return Ok(());
    }

    let found = match payload.as_value() {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    };
    Err(FormatError::NotAnObject { found })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
