//! File-backed order log
//!
//! Records are added with an append-mode write instead of the
//! fetch-concatenate-overwrite round trip, so two submissions handled by the
//! same process can no longer drop each other's record. Writers are
//! serialized by a `tokio::sync::Mutex` that also guards the cached record
//! count used for sequence numbers.
//!
//! The file keeps the exact text format of [`crate::order_log::format`], so
//! the relay route and the reader can keep serving it as plain text.

use crate::core::order::PlacedOrder;
use crate::core::service::{LogSource, OrderLog};
use crate::order_log::format::{RECORD_JOINER, count_records, format_block};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Order log stored in a single text file
#[derive(Clone)]
pub struct TextFileOrderLog {
    path: Arc<PathBuf>,
    /// Number of records in the file, loaded on first append
    records: Arc<Mutex<Option<u64>>>,
}

impl TextFileOrderLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            records: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_or_empty(&self) -> Result<String> {
        match tokio::fs::read_to_string(self.path.as_ref()).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read order log {}", self.path.display())),
        }
    }

    async fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl LogSource for TextFileOrderLog {
    async fn contents(&self) -> Result<String> {
        self.read_or_empty().await
    }
}

#[async_trait]
impl OrderLog for TextFileOrderLog {
    async fn append(&self, order: &PlacedOrder) -> Result<u64> {
        let mut records = self.records.lock().await;

        let current = match *records {
            Some(count) => count,
            None => count_records(&self.read_or_empty().await?) as u64,
        };

        self.ensure_parent().await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_ref())
            .await
            .with_context(|| format!("Failed to open order log {}", self.path.display()))?;

        let record = format!("{RECORD_JOINER}{}", format_block(order));
        file.write_all(record.as_bytes())
            .await
            .context("Failed to append order record")?;
        file.flush().await?;

        let sequence = current + 1;
        *records = Some(sequence);

        tracing::debug!(sequence, path = %self.path.display(), "appended order record");
        Ok(sequence)
    }

    async fn overwrite(&self, content: &str) -> Result<()> {
        let mut records = self.records.lock().await;

        self.ensure_parent().await?;
        tokio::fs::write(self.path.as_ref(), content)
            .await
            .with_context(|| format!("Failed to write order log {}", self.path.display()))?;

        *records = Some(count_records(content) as u64);
        Ok(())
    }
}
