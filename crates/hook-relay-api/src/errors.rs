//! Error types for the HTTP service

use crate::responses::WebhookResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hook_relay_core::webhook::{PayloadError, WebhookError};
use hook_relay_core::ValidationError;
use tracing::{error, warn};

/// Webhook handler errors with HTTP status code mapping
///
/// - `400 Bad Request`: the request itself is unusable (missing event header,
///   empty or malformed body). Retrying the same delivery will not help.
/// - `408 Request Timeout`: handling outlasted `server.timeout_seconds`.
/// - `500 Internal Server Error`: a handler panicked or the middleware stack
///   failed.
///
/// Ignored events and failed deliveries are not errors; they are reported as
/// successful responses.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// `X-GitHub-Event` header absent or blank
    #[error("No X-GitHub-Event header")]
    MissingEventType,

    /// Event header present but not a usable event type
    #[error("Invalid X-GitHub-Event header: {0}")]
    InvalidEventType(ValidationError),

    /// Body empty, not JSON, or an empty JSON value
    #[error("{0}")]
    InvalidPayload(#[from] PayloadError),

    /// Handling did not finish within the server request timeout
    #[error("Request timed out")]
    Timeout,

    /// Unexpected internal server error; the message is returned as is
    #[error("{message}")]
    Internal { message: String },
}

impl From<WebhookError> for WebhookHandlerError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::Headers(ValidationError::Required { .. }) => Self::MissingEventType,
            WebhookError::Headers(e) => Self::InvalidEventType(e),
            WebhookError::Payload(e) => Self::InvalidPayload(e),
        }
    }
}

impl WebhookHandlerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingEventType | Self::InvalidEventType(_) | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the outcome metric.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::MissingEventType | Self::InvalidEventType(_) => "invalid_headers",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::Timeout => "timeout",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(error = %message, "Webhook handling failed");
        } else {
            warn!(error = %message, "Rejected webhook request");
        }

        (status, Json(WebhookResponse::error(message))).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Telegram client setup failed: {message}")]
    ClientSetup { message: String },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
