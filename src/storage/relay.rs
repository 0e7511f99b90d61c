//! Order log kept behind the HTTP relay
//!
//! The relay only exposes a full read (`GET /orders.txt`) and a full
//! overwrite (`POST /api/update-orders`), so appending is a
//! read-modify-write. Two concurrent appends through the relay can still
//! lose one record; use the file backend when the log is local.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::core::order::PlacedOrder;
use crate::core::service::{LogSource, OrderLog};
use crate::order_log::format::{append_block, count_records};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Read-only access to a published log URL
#[derive(Debug, Clone)]
pub struct HttpLogSource {
    client: Client,
    url: String,
}

impl HttpLogSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LogSource for HttpLogSource {
    async fn contents(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch orders ({status})");
        }

        response.text().await.context("Failed to read order log body")
    }
}

/// Order log read and written through the relay routes of a storefront server
#[derive(Debug, Clone)]
pub struct RelayOrderLog {
    client: Client,
    log_url: String,
    update_url: String,
}

impl RelayOrderLog {
    /// `base_url` is the server root, e.g. `http://localhost:8080`
    pub fn new(base_url: &str) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client: build_client()?,
            log_url: format!("{base}/orders.txt"),
            update_url: format!("{base}/api/update-orders"),
        })
    }

    /// Current text, or empty when the relay does not serve one yet
    async fn fetch_existing(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.log_url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", self.log_url))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "order log not available, starting empty");
            return Ok(String::new());
        }

        response.text().await.context("Failed to read order log body")
    }

    async fn push(&self, content: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.update_url)
            .json(&json!({ "content": content }))
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.update_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("API error ({status}): {body}");
        }
        Ok(())
    }
}

#[async_trait]
impl LogSource for RelayOrderLog {
    async fn contents(&self) -> Result<String> {
        HttpLogSource {
            client: self.client.clone(),
            url: self.log_url.clone(),
        }
        .contents()
        .await
    }
}

#[async_trait]
impl OrderLog for RelayOrderLog {
    async fn append(&self, order: &PlacedOrder) -> Result<u64> {
        let existing = self.fetch_existing().await?;
        let content = append_block(&existing, order);
        self.push(&content).await?;
        Ok(count_records(&content) as u64)
    }

    async fn overwrite(&self, content: &str) -> Result<()> {
        self.push(content).await
    }
}
