//! Update delivery operations: long polling and webhook registration.

use serde_json::json;
use tracing::info;

use super::TelegramClient;
use crate::error::ApiError;
use crate::types::{GetUpdatesRequest, PolledUpdate, SetWebhookRequest, User};

impl TelegramClient {
    /// Fetch pending updates, waiting up to `timeout_seconds` for new ones.
    ///
    /// `offset` should be one greater than the highest `update_id` already
    /// handled; the API then forgets everything below it. Each entry is
    /// decoded on its own, so one malformed update does not fail the batch.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_seconds: u64,
    ) -> Result<Vec<PolledUpdate>, ApiError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_seconds,
            allowed_updates: vec!["message".to_string(), "channel_post".to_string()],
        };

        let entries: Vec<serde_json::Value> = self.call("getUpdates", &request).await?;
        Ok(entries.into_iter().map(PolledUpdate::from_value).collect())
    }

    /// Register `url` as the webhook that receives updates.
    pub async fn set_webhook(&self, url: &str) -> Result<(), ApiError> {
        if url.trim().is_empty() {
            return Err(ApiError::InvalidRequest {
                message: "webhook url must not be empty".to_string(),
            });
        }

        let request = SetWebhookRequest {
            url: url.to_string(),
            allowed_updates: vec!["message".to_string(), "channel_post".to_string()],
        };

        let _: bool = self.call("setWebhook", &request).await?;
        info!(url = %url, "Telegram webhook registered");
        Ok(())
    }

    /// Remove any registered webhook so that `getUpdates` can be used.
    pub async fn delete_webhook(&self) -> Result<(), ApiError> {
        let _: bool = self
            .call("deleteWebhook", &json!({ "drop_pending_updates": false }))
            .await?;
        Ok(())
    }

    /// Fetch the bot's own user record. Useful as a credential check.
    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.call("getMe", &json!({})).await
    }
}

#[cfg(test)]
#[path = "updates_tests.rs"]
mod tests;
