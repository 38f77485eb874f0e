//! # Telegram Bot SDK
//!
//! Small client for the parts of the Telegram Bot API that Hook-Relay needs.
//!
//! This SDK provides:
//! - Bot token handling with redacted debug output and zeroize-on-drop
//! - An HTTP client for `sendMessage`, `getUpdates`, `setWebhook`,
//!   `deleteWebhook` and `getMe`
//! - Typed request and response models (`Update`, `Message`, `Chat`, ...)
//! - Error classification for logging and retry decisions
//!
//! # Examples
//!
//! ```rust,no_run
//! use telegram_bot_sdk::{BotToken, ClientConfig, SendMessageRequest, TelegramClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let token = BotToken::new("123456:ABC-DEF")?;
//! let client = TelegramClient::new(token, ClientConfig::default())?;
//!
//! let request = SendMessageRequest::new("-1001234567890", "Hello from Hook-Relay");
//! let message = client.send_message(&request).await?;
//! println!("Sent message {}", message.message_id);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod client;
pub mod error;
pub mod token;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use client::{ClientConfig, ClientConfigBuilder, TelegramClient};
pub use error::{ApiError, TokenError};
pub use token::BotToken;
pub use types::{
    ApiResponse, Chat, ChatType, GetUpdatesRequest, Message, ParseMode, PolledUpdate,
    ResponseParameters, SendMessageRequest, SetWebhookRequest, Update, User,
};
