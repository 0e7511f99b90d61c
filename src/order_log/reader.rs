//! Read-only projection over the order log
//!
//! Every load downloads the whole log and parses it again; there is no
//! incremental fetch. [`OrderLogReader::watch`] repeats the load on a fixed
//! interval and, when an event bus is attached, right after an order lands
//! in the log.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::format::{LoggedOrder, parse_log};
use crate::core::error::{LogError, StoreResult};
use crate::core::events::{EventBus, EventEnvelope};
use crate::core::service::LogSource;

/// Default refresh period of [`OrderLogReader::watch`]
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Parsed orders, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderFeed {
    pub orders: Vec<LoggedOrder>,
    pub count: usize,
}

impl OrderFeed {
    pub fn new(orders: Vec<LoggedOrder>) -> Self {
        let count = orders.len();
        Self { orders, count }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Display number of the order at `index` ("Commande #N"), newest = N
    pub fn display_number(&self, index: usize) -> usize {
        self.count.saturating_sub(index)
    }
}

/// What a live view of the log currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Loading,
    Ready(OrderFeed),
    Failed(String),
}

impl FeedState {
    pub fn feed(&self) -> Option<&OrderFeed> {
        match self {
            FeedState::Ready(feed) => Some(feed),
            _ => None,
        }
    }
}

/// Fetches and parses the order log
#[derive(Clone)]
pub struct OrderLogReader {
    source: Arc<dyn LogSource>,
    event_bus: Option<EventBus>,
}

impl OrderLogReader {
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        Self {
            source,
            event_bus: None,
        }
    }

    /// Refresh watchers as soon as an order is appended
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Fetch the log once and parse it
    ///
    /// An empty log is an empty feed. Only a failed fetch is an error.
    pub async fn load(&self) -> StoreResult<OrderFeed> {
        let text = self.source.contents().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to fetch order log");
            LogError::Unavailable {
                message: e.to_string(),
            }
        })?;

        Ok(OrderFeed::new(parse_log(&text)))
    }

    /// Keep a feed up to date in the background
    ///
    /// The first load happens immediately. The task stops when the returned
    /// handle is dropped.
    pub fn watch(&self, interval: Duration) -> ReaderHandle {
        let (tx, rx) = watch::channel(FeedState::Loading);
        let reader = self.clone();
        let mut events = self.event_bus.as_ref().map(EventBus::subscribe);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = next_log_change(&mut events) => {
                        tracing::debug!("order log changed, refreshing");
                    }
                }

                let state = match reader.load().await {
                    Ok(feed) => FeedState::Ready(feed),
                    Err(e) => FeedState::Failed(e.to_string()),
                };

                if tx.send(state).is_err() {
                    break;
                }
            }
        });

        ReaderHandle { state: rx, task }
    }
}

async fn next_log_change(events: &mut Option<broadcast::Receiver<EventEnvelope>>) {
    let Some(rx) = events.as_mut() else {
        return std::future::pending().await;
    };

    loop {
        match rx.recv().await {
            Ok(envelope) if envelope.event.touches_log() => return,
            Ok(_) => continue,
            // Missed events may have touched the log
            Err(broadcast::error::RecvError::Lagged(_)) => return,
            Err(broadcast::error::RecvError::Closed) => {
                *events = None;
                return std::future::pending().await;
            }
        }
    }
}

/// Live view returned by [`OrderLogReader::watch`]
///
/// Dropping the handle stops the refresh task.
pub struct ReaderHandle {
    state: watch::Receiver<FeedState>,
    task: JoinHandle<()>,
}

impl ReaderHandle {
    /// Latest published state
    pub fn current(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Wait for the next published state
    pub async fn changed(&mut self) -> FeedState {
        if self.state.changed().await.is_err() {
            return self.current();
        }
        self.state.borrow_and_update().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }
}

impl Drop for ReaderHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
