//! Telegram Bot API client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::TelegramCredentials;
use crate::core::error::NotificationError;
use crate::core::service::Notifier;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// What the Bot API answered
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramReply {
    pub status: u16,
    /// Parsed JSON body, or the raw text when it is not JSON
    pub body: Value,
}

impl TelegramReply {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Bot API error description, if any
    pub fn description(&self) -> String {
        self.body
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.body.to_string())
    }
}

/// Sends HTML messages through `sendMessage`
///
/// With default credentials it is also a [`Notifier`] that talks to the Bot
/// API without going through the relay route.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    credentials: Option<TelegramCredentials>,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials: None,
        })
    }

    /// Credentials used when acting as a [`Notifier`]
    pub fn with_credentials(mut self, credentials: TelegramCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn endpoint(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }

    /// Post one message
    ///
    /// Only transport failures are errors; a non-OK answer comes back as a
    /// [`TelegramReply`] so callers can forward its status.
    pub async fn send_message(
        &self,
        credentials: &TelegramCredentials,
        text: &str,
    ) -> Result<TelegramReply, NotificationError> {
        let payload = SendMessage {
            chat_id: &credentials.chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(self.endpoint(&credentials.bot_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Transport {
                message: e.without_url().to_string(),
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| NotificationError::Transport {
                message: e.without_url().to_string(),
            })?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(TelegramReply { status, body })
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, message: &str) -> Result<()> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(NotificationError::Disabled)?;

        let reply = self.send_message(credentials, message).await?;
        if !reply.is_ok() {
            return Err(NotificationError::Rejected {
                status: reply.status,
                message: reply.description(),
            }
            .into());
        }

        tracing::debug!(chat_id = %credentials.chat_id, "telegram message sent");
        Ok(())
    }
}
