//! Bot commands received from chats.
//!
//! The bot understands a single command, `/get_chat_id`, which answers with
//! the id of the chat it was sent in so operators can configure destinations.

use crate::dispatch::{DispatchOutcome, MessageDispatcher};
use crate::ChatId;
use std::sync::Arc;
use telegram_bot_sdk::{Chat, Update};
use tracing::{debug, info};

/// Commands the bot responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    GetChatId,
}

impl BotCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetChatId => "get_chat_id",
        }
    }

    /// Parse the command at the start of a message.
    ///
    /// Accepts `/get_chat_id` and `/get_chat_id@<bot>`. Arguments after the
    /// command are ignored. Commands addressed to a different bot are not
    /// ours; when `bot_username` is unknown any addressee is accepted.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let command = token.strip_prefix('/')?;

        let (name, addressee) = match command.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (command, None),
        };

        if let (Some(addressee), Some(username)) = (addressee, bot_username) {
            let username = username.trim_start_matches('@');
            if !addressee.eq_ignore_ascii_case(username) {
                return None;
            }
        }

        match name {
            "get_chat_id" => Some(Self::GetChatId),
            _ => None,
        }
    }
}

/// Reply to `/get_chat_id`: the chat id plus configuration hints.
pub fn chat_id_reply(chat: &Chat) -> String {
    format!(
        "🤖 Hello! I relay GitHub notifications to Telegram.\n\n\
         Chat ID information for this {chat_type}:\n\
         Chat ID: `{id}`\n\n\
         Use this ID in your configuration:\n\
         1. As the default chat:\n\
         `TELEGRAM_DEFAULT_CHAT_ID={id}`\n\n\
         2. As the chat for specific events:\n\
         `EVENT_CHAT_MAPPING={{\"issues,issue_comment\": \"{id}\"}}`",
        chat_type = chat.chat_type,
        id = chat.id
    )
}

/// Answers bot commands found in incoming updates.
#[derive(Clone)]
pub struct CommandHandler {
    dispatcher: Arc<dyn MessageDispatcher>,
    bot_username: Option<String>,
}

impl CommandHandler {
    pub fn new(dispatcher: Arc<dyn MessageDispatcher>, bot_username: Option<String>) -> Self {
        Self {
            dispatcher,
            bot_username: bot_username.filter(|name| !name.trim().is_empty()),
        }
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.as_deref()
    }

    /// Find the command carried by `update`, if any.
    pub fn command_in<'a>(&self, update: &'a Update) -> Option<(BotCommand, &'a Chat)> {
        let message = update.effective_message()?;
        let text = message.text.as_deref()?;
        let command = BotCommand::parse(text, self.bot_username.as_deref())?;
        Some((command, &message.chat))
    }

    /// Handle one update.
    ///
    /// Returns the reply outcome when the update carried a command, `None`
    /// otherwise.
    pub async fn handle_update(&self, update: &Update) -> Option<DispatchOutcome> {
        let Some((command, chat)) = self.command_in(update) else {
            debug!(update_id = update.update_id, "Update carries no command");
            return None;
        };

        info!(
            update_id = update.update_id,
            chat_id = chat.id,
            command = command.name(),
            "Received bot command"
        );

        let reply = match command {
            BotCommand::GetChatId => chat_id_reply(chat),
        };

        Some(self.dispatcher.dispatch(&ChatId::from(chat.id), &reply).await)
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("bot_username", &self.bot_username)
            .finish()
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
