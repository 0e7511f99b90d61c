//! Internal event system for order notifications
//!
//! The EventBus decouples order dispatch from the consumers that want to
//! react to it (the log reader refresh loop, request tracing, ...).
//!
//! # Architecture
//!
//! ```text
//! OrderDispatcher ──▶ EventBus::publish() ──▶ broadcast channel ──▶ OrderLogReader::watch
//!                                                                ──▶ other subscribers
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let event_bus = EventBus::new(1024);
//! let mut rx = event_bus.subscribe();
//!
//! event_bus.publish(OrderEvent::Placed {
//!     sequence: Some(12),
//!     category: Category::Men,
//!     notification_sent: true,
//!     log_appended: true,
//! });
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("Received: {:?}", envelope.event);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::category::Category;

/// Events emitted by the order pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OrderEvent {
    /// At least one sink accepted the order
    Placed {
        /// Log sequence number, when the log append succeeded
        sequence: Option<u64>,
        category: Category,
        notification_sent: bool,
        log_appended: bool,
    },
    /// Both sinks rejected the order
    Failed { category: Category },
    /// The whole log was replaced through the relay update route
    LogRewritten,
}

impl OrderEvent {
    /// Get the action name (placed, failed, log_rewritten)
    pub fn action(&self) -> &str {
        match self {
            OrderEvent::Placed { .. } => "placed",
            OrderEvent::Failed { .. } => "failed",
            OrderEvent::LogRewritten => "log_rewritten",
        }
    }

    /// Whether the order log content changed
    pub fn touches_log(&self) -> bool {
        match self {
            OrderEvent::Placed { log_appended, .. } => *log_appended,
            OrderEvent::Failed { .. } => false,
            OrderEvent::LogRewritten => true,
        }
    }
}

/// Envelope wrapping an order event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: OrderEvent,
}

impl EventEnvelope {
    pub fn new(event: OrderEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will get the event.
    pub fn publish(&self, event: OrderEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() only errors when nobody is listening
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
