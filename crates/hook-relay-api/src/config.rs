//! Configuration types for the HTTP service

use crate::errors::ConfigError;
use hook_relay_core::dispatch::DispatchSettings;
use hook_relay_core::markdown::TELEGRAM_MESSAGE_LIMIT;
use hook_relay_core::routing::{DestinationMap, RouteRule};
use hook_relay_core::{ChatId, EventType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use telegram_bot_sdk::{BotToken, ClientConfig, ParseMode, TokenError};

/// Paths served by the service itself, unavailable as the webhook endpoint.
pub const RESERVED_PATHS: &[&str] = &["/health", "/ready", "/metrics", "/telegram-webhook"];

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Chat platform settings
    pub telegram: TelegramConfig,

    /// Event routing settings
    pub routing: RoutingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Long-poll for bot updates instead of registering a webhook
    pub development_mode: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            telegram: TelegramConfig::default(),
            routing: RoutingConfig::default(),
            logging: LoggingConfig::default(),
            development_mode: true,
        }
    }
}

impl ServiceConfig {
    /// Check the configuration before any component is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.telegram.validate()?;
        self.routing.validate()?;

        // A webhook waits for its delivery attempt, so the request timeout
        // has to leave room for the full Bot API call.
        if self.server.timeout_seconds <= self.telegram.request_timeout_seconds {
            return Err(ConfigError::Invalid {
                message: format!(
                    "server.timeout_seconds ({}) must be greater than telegram.request_timeout_seconds ({})",
                    self.server.timeout_seconds, self.telegram.request_timeout_seconds
                ),
            });
        }

        Ok(())
    }

    /// Destination map from the structured routes, then the compact mapping,
    /// with the default chat as fallback.
    pub fn destination_map(&self) -> Result<DestinationMap, ConfigError> {
        let mut builder = DestinationMap::builder()
            .default_destination(self.telegram.default_chat_id()?)
            .routes(self.routing.route_rules()?);

        if let Some(mapping) = &self.routing.event_chat_mapping {
            builder = builder.event_chat_mapping(mapping);
        }

        Ok(builder.build())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
            shutdown_timeout_seconds: 30,
            max_body_size: 5 * 1024 * 1024, // 5MB
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be between 1 and 65535".to_string(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "server.host".to_string(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "server.timeout_seconds must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Chat platform configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token (secret)
    pub bot_token: String,

    /// Bot username, used to recognise commands addressed to this bot
    pub bot_username: Option<String>,

    /// Chat receiving events without a specific route
    pub default_chat_id: String,

    /// Bot API base URL
    pub api_url: String,

    /// Public base URL of this service, for webhook registration
    pub public_url: Option<String>,

    /// Timeout for Bot API calls in seconds
    pub request_timeout_seconds: u64,

    /// Message markup: `Markdown`, `MarkdownV2`, `HTML` or `none`
    pub parse_mode: String,

    pub disable_web_page_preview: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            bot_username: None,
            default_chat_id: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            public_url: None,
            request_timeout_seconds: 10,
            parse_mode: ParseMode::Markdown.to_string(),
            disable_web_page_preview: true,
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.bot_token.is_empty() {
            "<EMPTY>"
        } else {
            "<REDACTED>"
        };
        f.debug_struct("TelegramConfig")
            .field("bot_token", &token)
            .field("bot_username", &self.bot_username)
            .field("default_chat_id", &self.default_chat_id)
            .field("api_url", &self.api_url)
            .field("public_url", &self.public_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("parse_mode", &self.parse_mode)
            .field("disable_web_page_preview", &self.disable_web_page_preview)
            .finish()
    }
}

impl TelegramConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.bot_token()?;
        self.default_chat_id()?;
        self.parse_mode()?;

        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "telegram.request_timeout_seconds must be greater than zero".to_string(),
            });
        }

        for (key, url) in [
            ("telegram.api_url", Some(&self.api_url)),
            ("telegram.public_url", self.public_url.as_ref()),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(ConfigError::Invalid {
                        message: format!("{} must be an http(s) URL, got '{}'", key, url),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn bot_token(&self) -> Result<BotToken, ConfigError> {
        BotToken::new(self.bot_token.clone()).map_err(|e| match e {
            TokenError::Empty => ConfigError::Missing {
                key: "telegram.bot_token".to_string(),
            },
            e => ConfigError::Invalid {
                message: format!("telegram.bot_token: {}", e),
            },
        })
    }

    pub fn default_chat_id(&self) -> Result<ChatId, ConfigError> {
        if self.default_chat_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "telegram.default_chat_id".to_string(),
            });
        }
        ChatId::new(&self.default_chat_id).map_err(|e| ConfigError::Invalid {
            message: format!("telegram.default_chat_id: {}", e),
        })
    }

    /// Parsed markup mode; `None` sends plain text.
    pub fn parse_mode(&self) -> Result<Option<ParseMode>, ConfigError> {
        let value = self.parse_mode.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        value
            .parse::<ParseMode>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                message: format!("telegram.parse_mode: {}", e),
            })
    }

    /// URL Telegram should post bot updates to, when a public URL is known.
    pub fn update_webhook_url(&self) -> Option<String> {
        self.public_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| format!("{}/telegram-webhook", url.trim_end_matches('/')))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::builder()
            .api_url(self.api_url.clone())
            .timeout(Duration::from_secs(self.request_timeout_seconds))
            .user_agent(format!("hook-relay/{}", env!("CARGO_PKG_VERSION")))
            .build()
    }

    pub fn dispatch_settings(&self) -> Result<DispatchSettings, ConfigError> {
        Ok(DispatchSettings {
            parse_mode: self.parse_mode()?,
            disable_web_page_preview: self.disable_web_page_preview,
            max_message_length: TELEGRAM_MESSAGE_LIMIT,
        })
    }
}

/// A structured route as written in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub events: Vec<String>,
    pub chat_id: String,
}

/// Event routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Webhook endpoint path
    pub endpoint_path: String,

    /// Event type to chat routes, applied in order
    pub routes: Vec<RouteConfig>,

    /// Compact JSON mapping `{"type1,type2": "chat_id"}`, applied after `routes`
    pub event_chat_mapping: Option<String>,

    /// Relay unregistered event types with a generic message
    pub forward_unknown_events: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/webhook".to_string(),
            routes: Vec::new(),
            event_chat_mapping: None,
            forward_unknown_events: false,
        }
    }
}

impl RoutingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint_path.starts_with('/') || self.endpoint_path.len() < 2 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "routing.endpoint_path must be an absolute path, got '{}'",
                    self.endpoint_path
                ),
            });
        }
        if RESERVED_PATHS.contains(&self.endpoint_path.as_str()) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "routing.endpoint_path '{}' collides with a built-in endpoint",
                    self.endpoint_path
                ),
            });
        }

        self.route_rules()?;
        Ok(())
    }

    pub fn route_rules(&self) -> Result<Vec<RouteRule>, ConfigError> {
        self.routes
            .iter()
            .enumerate()
            .map(|(index, route)| {
                let chat_id = ChatId::new(&route.chat_id).map_err(|e| ConfigError::Invalid {
                    message: format!("routing.routes[{}].chat_id: {}", index, e),
                })?;

                let events = route
                    .events
                    .iter()
                    .map(EventType::new)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ConfigError::Invalid {
                        message: format!("routing.routes[{}].events: {}", index, e),
                    })?;
                if events.is_empty() {
                    return Err(ConfigError::Invalid {
                        message: format!("routing.routes[{}] lists no events", index),
                    });
                }

                Ok(RouteRule::new(events, chat_id))
            })
            .collect()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
