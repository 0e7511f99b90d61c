//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds everything the HTTP layer needs: configuration, the
//! dispatcher and its two sinks, the log reader, and the event bus. It knows
//! nothing about routes.

use crate::config::StorefrontConfig;
use crate::core::events::EventBus;
use crate::core::service::OrderLog;
use crate::dispatch::OrderDispatcher;
use crate::intake::OrderIntake;
use crate::notify::TelegramClient;
use crate::order_log::{OrderLogReader, ReaderHandle};
use std::sync::Arc;

/// Host context containing all storefront state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerBuilder::new().build_host()?);
/// let app = RestExposure::build_router(host, vec![])?;
/// ```
pub struct ServerHost {
    pub config: Arc<StorefrontConfig>,

    /// Fans orders out to the notifier and the log
    pub dispatcher: OrderDispatcher,

    /// The log written by the dispatcher and by the relay update route
    pub order_log: Arc<dyn OrderLog>,

    /// Read side of the log
    pub reader: OrderLogReader,

    /// Bot API client used by the Telegram relay route
    pub telegram: TelegramClient,

    /// Order events; the log reader refreshes on them
    pub event_bus: Option<EventBus>,
}

impl ServerHost {
    pub fn new(
        config: StorefrontConfig,
        dispatcher: OrderDispatcher,
        order_log: Arc<dyn OrderLog>,
        reader: OrderLogReader,
        telegram: TelegramClient,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
            order_log,
            reader,
            telegram,
            event_bus: None,
        }
    }

    /// Set the event bus
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Get a reference to the event bus (if configured)
    pub fn event_bus(&self) -> Option<&EventBus> {
        self.event_bus.as_ref()
    }

    /// A fresh order form wired to this host's dispatcher
    pub fn intake(&self) -> OrderIntake {
        OrderIntake::new(self.dispatcher.clone())
            .with_reset_delay(self.config.intake.reset_delay())
            .with_reset_policy(self.config.intake.reset_policy)
    }

    /// Live view of the log, refreshed at the configured interval
    pub fn watch_orders(&self) -> ReaderHandle {
        self.reader.watch(self.config.reader.refresh_interval())
    }
}
