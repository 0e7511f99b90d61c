//! Fan-out of validated orders to the notification sink and the order log
//!
//! An order counts as placed when at least one sink accepted it. Nothing is
//! rolled back when the other one fails, and nothing is deduplicated: a
//! resubmission produces a second message and a second record.

pub mod message;

pub use message::MessageFormatter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::events::{EventBus, OrderEvent};
use crate::core::order::{Order, PlacedOrder};
use crate::core::service::{Notifier, OrderLog};

/// Source of the timestamp stamped on each order
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Result of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    /// `notification_sent || log_appended`
    pub success: bool,
    pub notification_sent: bool,
    pub log_appended: bool,
    /// Sequence number given by the log, when the append succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl DispatchOutcome {
    fn new(notification_sent: bool, sequence: Option<u64>) -> Self {
        let log_appended = sequence.is_some();
        Self {
            success: notification_sent || log_appended,
            notification_sent,
            log_appended,
            sequence,
        }
    }
}

#[derive(Clone)]
pub struct OrderDispatcher {
    notifier: Arc<dyn Notifier>,
    log: Arc<dyn OrderLog>,
    formatter: Arc<MessageFormatter>,
    clock: Clock,
    event_bus: Option<EventBus>,
}

impl OrderDispatcher {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        log: Arc<dyn OrderLog>,
        formatter: MessageFormatter,
    ) -> Self {
        Self {
            notifier,
            log,
            formatter: Arc::new(formatter),
            clock: Arc::new(Utc::now),
            event_bus: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn order_log(&self) -> Arc<dyn OrderLog> {
        self.log.clone()
    }

    /// Send `order` to both sinks
    ///
    /// Never fails: sink errors are logged and reported as `false` flags.
    pub async fn dispatch(&self, order: Order) -> DispatchOutcome {
        let placed = PlacedOrder::new(order, (self.clock)());

        let (notification_sent, sequence) =
            tokio::join!(self.notify(&placed), self.append(&placed));

        let outcome = DispatchOutcome::new(notification_sent, sequence);

        if outcome.success {
            tracing::info!(
                category = %placed.category,
                notification_sent,
                log_appended = outcome.log_appended,
                sequence = ?outcome.sequence,
                "order placed"
            );
        } else {
            tracing::error!(category = %placed.category, "order lost: every sink failed");
        }

        if let Some(bus) = &self.event_bus {
            let event = if outcome.success {
                OrderEvent::Placed {
                    sequence: outcome.sequence,
                    category: placed.category,
                    notification_sent,
                    log_appended: outcome.log_appended,
                }
            } else {
                OrderEvent::Failed {
                    category: placed.category,
                }
            };
            bus.publish(event);
        }

        outcome
    }

    async fn notify(&self, order: &PlacedOrder) -> bool {
        let message = match self.formatter.render(order) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "failed to render order message");
                return false;
            }
        };

        match self.notifier.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to send order notification");
                false
            }
        }
    }

    async fn append(&self, order: &PlacedOrder) -> Option<u64> {
        match self.log.append(order).await {
            Ok(sequence) => Some(sequence),
            Err(e) => {
                tracing::warn!(error = %e, "failed to append order to log");
                None
            }
        }
    }
}
