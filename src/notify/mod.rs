//! Notification sinks
//!
//! A [`Notifier`] gets one pre-formatted HTML message per order. Delivery
//! is best effort: the dispatcher records a failure and moves on.

pub mod relay;
pub mod telegram;

pub use relay::{RelayNotifier, TelegramRelayRequest};
pub use telegram::{DEFAULT_API_BASE, TelegramClient, TelegramReply};

use crate::core::error::NotificationError;
use crate::core::service::Notifier;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Placeholder written in place of a missing bot token
pub const PLACEHOLDER_BOT_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";
/// Placeholder written in place of a missing chat id
pub const PLACEHOLDER_CHAT_ID: &str = "YOUR_CHAT_ID_HERE";

/// Bot token and destination chat
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramCredentials {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// True while either value is still the placeholder
    pub fn is_placeholder(&self) -> bool {
        self.bot_token == PLACEHOLDER_BOT_TOKEN || self.chat_id == PLACEHOLDER_CHAT_ID
    }
}

impl Default for TelegramCredentials {
    fn default() -> Self {
        Self::new(PLACEHOLDER_BOT_TOKEN, PLACEHOLDER_CHAT_ID)
    }
}

// The token is a secret
impl std::fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Notifier for setups without a notification channel
///
/// Every send fails, so an order still counts as placed only when the log
/// append succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _message: &str) -> Result<()> {
        Err(NotificationError::Disabled.into())
    }
}
