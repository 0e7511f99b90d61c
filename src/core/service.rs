//! Service traits for the two order sinks
//!
//! The dispatcher and the log reader only see these traits; whether a sink
//! talks to a relay, a bot API, a local file or memory is decided when the
//! server is assembled.

use crate::core::order::PlacedOrder;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Delivers a human-readable order message to an external channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message; any error means the message was not delivered
    async fn send(&self, message: &str) -> Result<()>;
}

/// Read access to the full text of the order log
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch the whole log as text
    async fn contents(&self) -> Result<String>;
}

/// The append-only order log
///
/// There are no update or delete operations on individual records; the only
/// way to change past records is [`OrderLog::overwrite`], which replaces the
/// whole text.
#[async_trait]
pub trait OrderLog: LogSource {
    /// Append one record
    ///
    /// Returns the record's sequence number. Numbers increase by one per
    /// successful append.
    async fn append(&self, order: &PlacedOrder) -> Result<u64>;

    /// Replace the whole log text
    async fn overwrite(&self, content: &str) -> Result<()>;
}

/// Exposes a shared [`OrderLog`] as a plain [`LogSource`]
#[derive(Clone)]
pub struct SharedLogSource(pub Arc<dyn OrderLog>);

#[async_trait]
impl LogSource for SharedLogSource {
    async fn contents(&self) -> Result<String> {
        self.0.contents().await
    }
}
