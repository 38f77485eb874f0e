//! Response bodies returned by the HTTP endpoints.

use hook_relay_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Result category of a webhook request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Success,
    Ignored,
    Error,
}

/// Webhook processing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: WebhookStatus,
    pub message: String,
}

impl WebhookResponse {
    /// Message was relayed; carries the formatted text.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: WebhookStatus::Success,
            message: message.into(),
        }
    }

    pub fn ignored(reason: impl Into<String>) -> Self {
        Self {
            status: WebhookStatus::Ignored,
            message: reason.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: WebhookStatus::Error,
            message: message.into(),
        }
    }
}

/// Acknowledgement for bot updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: Timestamp,
    pub version: String,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub timestamp: Timestamp,
}
