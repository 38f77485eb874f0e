//! Telegram Bot API client.
//!
//! Every Bot API method is an HTTPS `POST` to
//! `{api_url}/bot{token}/{method}` with a JSON body, answered by an
//! [`ApiResponse`] envelope. [`TelegramClient`] owns that plumbing; the
//! individual methods live in the `messages` and `updates` submodules.

mod messages;
mod updates;

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::ApiError;
use crate::token::BotToken;
use crate::types::ApiResponse;

/// Configuration for Telegram API client behavior.
///
/// # Examples
///
/// ```
/// use telegram_bot_sdk::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(5))
///     .with_api_url("http://localhost:8081");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// Telegram Bot API base URL
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("telegram-bot-sdk/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the Bot API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Builder for constructing `ClientConfig` instances.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new configuration builder with defaults.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the Bot API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Telegram Bot API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct TelegramClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    token: Arc<BotToken>,
}

impl TelegramClient {
    /// Create a client for the given bot.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(token: BotToken, config: ClientConfig) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest {
                message: format!("Failed to build HTTP client: {}", e.without_url()),
            })?;

        Ok(Self {
            http_client,
            config,
            token: Arc::new(token),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.token.expose_secret(),
            method
        )
    }

    /// Invoke a Bot API method and unwrap its response envelope.
    pub(crate) async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = method, "Calling Telegram Bot API");

        let response = self
            .http_client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ApiError::InvalidResponse {
                    message: format!("Failed to parse {} response: {}", method, e),
                });
            }
            Err(_) => {
                return Err(ApiError::Api {
                    status: status.as_u16(),
                    description: String::from_utf8_lossy(&bytes).into_owned(),
                    retry_after: None,
                });
            }
        };

        if envelope.ok {
            return envelope.result.ok_or_else(|| ApiError::InvalidResponse {
                message: format!("{} response is missing 'result'", method),
            });
        }

        let code = envelope.error_code.unwrap_or_else(|| status.as_u16());
        if code == 401 {
            return Err(ApiError::Unauthorized);
        }

        Err(ApiError::Api {
            status: code,
            description: envelope
                .description
                .unwrap_or_else(|| "Unknown error".to_string()),
            retry_after: envelope.parameters.and_then(|p| p.retry_after),
        })
    }
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("config", &self.config)
            .field("token", &self.token)
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
