//! In-memory implementation of OrderLog for testing and development

use crate::core::order::PlacedOrder;
use crate::core::service::{LogSource, OrderLog};
use crate::order_log::format::{append_block, count_records};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// In-memory order log
///
/// Holds the same text a file-backed log would. Clones share the text.
#[derive(Clone, Default)]
pub struct InMemoryOrderLog {
    text: Arc<RwLock<String>>,
}

impl InMemoryOrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing log text
    pub fn with_contents(content: impl Into<String>) -> Self {
        Self {
            text: Arc::new(RwLock::new(content.into())),
        }
    }

    pub fn record_count(&self) -> Result<usize> {
        let text = self
            .text
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(count_records(&text))
    }
}

#[async_trait]
impl LogSource for InMemoryOrderLog {
    async fn contents(&self) -> Result<String> {
        let text = self
            .text
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(text.clone())
    }
}

#[async_trait]
impl OrderLog for InMemoryOrderLog {
    async fn append(&self, order: &PlacedOrder) -> Result<u64> {
        let mut text = self
            .text
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        *text = append_block(&text, order);

        Ok(count_records(&text) as u64)
    }

    async fn overwrite(&self, content: &str) -> Result<()> {
        let mut text = self
            .text
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        *text = content.to_string();

        Ok(())
    }
}
