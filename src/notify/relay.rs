//! Notifier that goes through the server's `/api/telegram` relay route

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::TelegramCredentials;
use crate::core::error::NotificationError;
use crate::core::service::Notifier;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Body of `POST /api/telegram`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramRelayRequest {
    pub message: String,
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct RelayNotifier {
    client: Client,
    url: String,
    credentials: TelegramCredentials,
}

impl RelayNotifier {
    /// `base_url` is the server root, e.g. `http://localhost:8080`
    pub fn new(base_url: &str, credentials: TelegramCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: format!("{}/api/telegram", base_url.trim_end_matches('/')),
            credentials,
        })
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let request = TelegramRelayRequest {
            message: message.to_string(),
            bot_token: self.credentials.bot_token.clone(),
            chat_id: self.credentials.chat_id.clone(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotificationError::Transport {
                message: e.to_string(),
            })?;

        // Only a plain 200 counts as delivered
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Telegram relay error")
            .to_string();

        Err(NotificationError::Rejected {
            status: status.as_u16(),
            message,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relay_request_uses_camel_case() {
        let request = TelegramRelayRequest {
            message: "<b>Nouvelle commande</b>".to_string(),
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"message": "<b>Nouvelle commande</b>", "botToken": "123:abc", "chatId": "42"})
        );
    }

    #[test]
    fn test_url_joins_base() {
        let notifier =
            RelayNotifier::new("http://localhost:8080/", TelegramCredentials::default()).unwrap();
        assert_eq!(notifier.url, "http://localhost:8080/api/telegram");
    }
}
