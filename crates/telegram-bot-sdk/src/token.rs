//! Bot token handling.
//!
//! The token is part of every Bot API URL, so it must never end up in logs.
//! [`BotToken`] redacts itself in `Debug` output and zeroizes its memory on drop.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::TokenError;

/// Telegram bot token issued by BotFather (`<bot_id>:<secret>`).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BotToken(String);

impl BotToken {
    /// Create a token, rejecting empty values and values containing whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, TokenError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TokenError::Empty);
        }

        if value.chars().any(char::is_whitespace) {
            return Err(TokenError::InvalidCharacters);
        }

        Ok(Self(value))
    }

    /// Raw token value. Only for building request URLs.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// The numeric bot id prefix, if the token has the usual `id:secret` shape.
    pub fn bot_id(&self) -> Option<i64> {
        self.0.split_once(':').and_then(|(id, _)| id.parse().ok())
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(<REDACTED>)")
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
