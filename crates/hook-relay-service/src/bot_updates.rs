//! How the bot receives its updates.
//!
//! In development mode the service long-polls `getUpdates`; otherwise the
//! platform is asked to post updates to `/telegram-webhook`.

use hook_relay_api::{process_update, AppState, TelegramConfig};
use std::time::Duration;
use telegram_bot_sdk::{ApiError, PolledUpdate, TelegramClient};
use tracing::{debug, error, info, warn};

/// Seconds `getUpdates` waits for new updates before answering empty.
pub const POLL_TIMEOUT_SECONDS: u64 = 30;

/// Pause after a failed poll.
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// HTTP timeout for polling requests; must outlast the long-poll wait.
pub fn poll_request_timeout() -> Duration {
    Duration::from_secs(POLL_TIMEOUT_SECONDS + 10)
}

/// Mode the bot ended up in after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateMode {
    Polling,
    Webhook { url: String },
    /// No public URL; the bot will not receive commands.
    Disabled,
}

/// Log the bot identity. Failures are reported but do not stop startup.
pub async fn verify_bot(client: &TelegramClient) {
    match client.get_me().await {
        Ok(bot) => info!(
            bot_id = bot.id,
            username = bot.username.as_deref().unwrap_or(""),
            "Connected to Telegram Bot API"
        ),
        Err(ApiError::Unauthorized) => {
            error!("Telegram rejected the bot token; messages will not be delivered")
        }
        Err(e) => warn!(error = %e, "Could not verify bot credentials"),
    }
}

/// Prepare update delivery for the configured mode.
pub async fn configure_update_mode(
    client: &TelegramClient,
    telegram: &TelegramConfig,
    development_mode: bool,
) -> UpdateMode {
    if development_mode {
        // A registered webhook makes getUpdates fail with a conflict.
        if let Err(e) = client.delete_webhook().await {
            warn!(error = %e, "Failed to remove registered webhook before polling");
        }
        info!("Development mode: polling for bot updates");
        return UpdateMode::Polling;
    }

    let Some(url) = telegram.update_webhook_url() else {
        warn!("telegram.public_url is not set; bot commands will not be received");
        return UpdateMode::Disabled;
    };

    match client.set_webhook(&url).await {
        Ok(()) => UpdateMode::Webhook { url },
        Err(e) => {
            error!(error = %e, url = %url, "Failed to register bot webhook");
            UpdateMode::Disabled
        }
    }
}

/// Long-polling loop feeding bot updates to the command handler.
#[derive(Debug)]
pub struct UpdatePoller {
    client: TelegramClient,
    state: AppState,
    poll_timeout_seconds: u64,
    retry_delay: Duration,
}

impl UpdatePoller {
    pub fn new(client: TelegramClient, state: AppState) -> Self {
        Self {
            client,
            state,
            poll_timeout_seconds: POLL_TIMEOUT_SECONDS,
            retry_delay: POLL_RETRY_DELAY,
        }
    }

    pub fn with_poll_timeout(mut self, seconds: u64) -> Self {
        self.poll_timeout_seconds = seconds;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fetch one batch and handle it.
    ///
    /// Returns the offset for the next call: one past the highest update id
    /// seen, or `offset` unchanged when the batch was empty. Updates that do
    /// not decode are skipped but still counted towards the offset.
    pub async fn poll_once(&self, offset: Option<i64>) -> Result<Option<i64>, ApiError> {
        let updates = self
            .client
            .get_updates(offset, self.poll_timeout_seconds)
            .await?;

        let mut next_offset = offset;
        for polled in &updates {
            match polled {
                PolledUpdate::Decoded(update) => {
                    debug!(update_id = update.update_id, "Processing polled update");
                    process_update(&self.state, update).await;
                }
                PolledUpdate::Undecodable { update_id, reason } => {
                    warn!(update_id = ?update_id, error = %reason, "Skipping undecodable update");
                }
            }
            if let Some(update_id) = polled.update_id() {
                next_offset = Some(next_offset.map_or(update_id + 1, |current| {
                    current.max(update_id + 1)
                }));
            }
        }

        Ok(next_offset)
    }

    /// Poll until the task is cancelled.
    pub async fn run(self) {
        let mut offset = None;
        loop {
            match self.poll_once(offset).await {
                Ok(next) => offset = next,
                Err(e) => {
                    if let Some(delay) = e.retry_after() {
                        warn!(error = %e, delay_seconds = delay.as_secs(), "Polling rate limited");
                        tokio::time::sleep(delay).await;
                    } else {
                        error!(error = %e, "Polling for bot updates failed");
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "bot_updates_tests.rs"]
mod tests;
