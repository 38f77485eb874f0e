//! Event routing: which formatter renders an event and which chat receives it.

use crate::formatter::{FormatOutcome, FormatterRegistry};
use crate::webhook::WebhookEvent;
use crate::{ChatId, EventType, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error, warn};

/// Sends one or more event types to a specific chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub events: Vec<EventType>,
    pub chat_id: ChatId,
}

impl RouteRule {
    pub fn new(events: Vec<EventType>, chat_id: ChatId) -> Self {
        Self { events, chat_id }
    }
}

/// Errors in the compact `{"type1,type2": "chat_id"}` mapping format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("Event chat mapping is not valid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Event chat mapping must be a JSON object")]
    NotAnObject,

    #[error("Invalid chat id for '{events}': {source}")]
    InvalidChatId {
        events: String,
        #[source]
        source: ValidationError,
    },
}

/// Parse the compact event-to-chat mapping.
///
/// Keys are comma separated event type lists; values are chat ids given as
/// strings or numbers. Key order is preserved. Empty list entries are dropped.
pub fn parse_event_chat_mapping(raw: &str) -> Result<Vec<RouteRule>, MappingError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| MappingError::InvalidJson {
            message: e.to_string(),
        })?;
    let entries = value.as_object().ok_or(MappingError::NotAnObject)?;

    let mut rules = Vec::with_capacity(entries.len());
    for (key, chat) in entries {
        let chat_text = match chat {
            serde_json::Value::String(value) => value.clone(),
            serde_json::Value::Number(value) => value.to_string(),
            _ => String::new(),
        };
        let chat_id = ChatId::new(&chat_text).map_err(|source| MappingError::InvalidChatId {
            events: key.clone(),
            source,
        })?;

        let events: Vec<EventType> = key
            .split(',')
            .filter_map(|part| EventType::new(part).ok())
            .collect();
        if events.is_empty() {
            warn!(key = %key, "Event chat mapping entry lists no event types");
            continue;
        }

        rules.push(RouteRule::new(events, chat_id));
    }

    Ok(rules)
}

/// Event type to destination chat lookup with a default fallback.
#[derive(Debug, Clone, Default)]
pub struct DestinationMap {
    routes: HashMap<EventType, ChatId>,
    default_destination: Option<ChatId>,
}

impl DestinationMap {
    pub fn builder() -> DestinationMapBuilder {
        DestinationMapBuilder::default()
    }

    /// Destination for `event_type`: its specific chat, else the default.
    pub fn resolve(&self, event_type: &EventType) -> Option<&ChatId> {
        self.routes
            .get(event_type)
            .or(self.default_destination.as_ref())
    }

    pub fn specific(&self, event_type: &EventType) -> Option<&ChatId> {
        self.routes.get(event_type)
    }

    pub fn default_destination(&self) -> Option<&ChatId> {
        self.default_destination.as_ref()
    }

    /// Number of event types with a specific destination.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder for [`DestinationMap`].
///
/// Rules are applied in the order they are added. When an event type appears
/// in more than one rule the first assignment is kept.
#[derive(Debug, Default)]
pub struct DestinationMapBuilder {
    rules: Vec<RouteRule>,
    default_destination: Option<ChatId>,
}

impl DestinationMapBuilder {
    pub fn default_destination(mut self, chat_id: ChatId) -> Self {
        self.default_destination = Some(chat_id);
        self
    }

    pub fn route(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn routes(mut self, rules: impl IntoIterator<Item = RouteRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Add rules from the compact JSON mapping.
    ///
    /// A malformed mapping is logged and contributes no rules.
    pub fn event_chat_mapping(self, raw: &str) -> Self {
        match parse_event_chat_mapping(raw) {
            Ok(rules) => self.routes(rules),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed event chat mapping");
                self
            }
        }
    }

    pub fn build(self) -> DestinationMap {
        let mut routes = HashMap::new();
        for rule in self.rules {
            for event_type in rule.events {
                if let Some(existing) = routes.get(&event_type) {
                    warn!(
                        event_type = %event_type,
                        kept = %existing,
                        ignored = %rule.chat_id,
                        "Event type mapped more than once, keeping first destination"
                    );
                    continue;
                }
                routes.insert(event_type, rule.chat_id.clone());
            }
        }

        DestinationMap {
            routes,
            default_destination: self.default_destination,
        }
    }
}

/// Why an event produced no delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// No formatter is registered for the event type.
    UnsupportedEvent,
    /// The formatter declined this payload, usually because of its action.
    FilteredAction,
    /// Neither a specific nor a default destination is configured.
    NoDestination,
}

impl IgnoreReason {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedEvent => "unsupported_event",
            Self::FilteredAction => "filtered_action",
            Self::NoDestination => "no_destination",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::UnsupportedEvent => "Unsupported event type",
            Self::FilteredAction => "Unsupported event action",
            Self::NoDestination => "No destination configured for event",
        };
        f.write_str(message)
    }
}

/// A message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub destination: ChatId,
    pub text: String,
}

/// Result of routing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Deliver(Delivery),
    Ignored(IgnoreReason),
}

/// Combines the formatter registry and the destination map.
#[derive(Debug, Clone)]
pub struct EventRouter {
    formatters: FormatterRegistry,
    destinations: DestinationMap,
}

impl EventRouter {
    pub fn new(formatters: FormatterRegistry, destinations: DestinationMap) -> Self {
        Self {
            formatters,
            destinations,
        }
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn destinations(&self) -> &DestinationMap {
        &self.destinations
    }

    /// Decide what to do with `event`.
    ///
    /// Formatting happens before destination lookup so that filtered events
    /// are reported as such even when no destination exists.
    pub fn route(&self, event: &WebhookEvent) -> RoutingDecision {
        let event_type = event.event_type();

        let text = match self.formatters.format(event_type, event.payload()) {
            FormatOutcome::Message(text) => text,
            FormatOutcome::NoMessage => {
                debug!(event_type = %event_type, "Event filtered by formatter");
                return RoutingDecision::Ignored(IgnoreReason::FilteredAction);
            }
            FormatOutcome::Unregistered => {
                debug!(event_type = %event_type, "No formatter registered for event type");
                return RoutingDecision::Ignored(IgnoreReason::UnsupportedEvent);
            }
        };

        match self.destinations.resolve(event_type) {
            Some(destination) => RoutingDecision::Deliver(Delivery {
                destination: destination.clone(),
                text,
            }),
            None => {
                error!(
                    event_type = %event_type,
                    "No chat configured for event type and no default destination"
                );
                RoutingDecision::Ignored(IgnoreReason::NoDestination)
            }
        }
    }
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
