//! Error types for Telegram Bot API operations.
//!
//! Errors carry enough classification for callers to decide whether a failure
//! is worth retrying, even though Hook-Relay itself delivers at most once.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`TelegramClient`](crate::TelegramClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection refused, TLS, ...).
    ///
    /// The message never contains the request URL, because the URL embeds the
    /// bot token.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request to the Telegram API timed out")]
    Timeout,

    /// The bot token was rejected (HTTP 401).
    #[error("Unauthorized: the bot token was rejected by the Telegram API")]
    Unauthorized,

    /// The API answered with `ok: false`.
    #[error("Telegram API error {status}: {description}")]
    Api {
        status: u16,
        description: String,
        retry_after: Option<u64>,
    },

    /// The response body could not be interpreted.
    #[error("Invalid response from the Telegram API: {message}")]
    InvalidResponse { message: String },

    /// The request could not be built.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl ApiError {
    /// Check if the failure is transient and a later attempt may succeed.
    ///
    /// Transient: network failures, timeouts, server errors (5xx) and flood
    /// control (429). Everything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Unauthorized | Self::InvalidResponse { .. } | Self::InvalidRequest { .. } => {
                false
            }
        }
    }

    /// Delay requested by the API before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api {
                retry_after: Some(seconds),
                ..
            } => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }

        // Strip the URL so the token cannot leak through the error message.
        Self::Network(error.without_url().to_string())
    }
}

/// Errors produced while constructing a [`BotToken`](crate::BotToken).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Bot token must not be empty")]
    Empty,

    #[error("Bot token must not contain whitespace")]
    InvalidCharacters,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
