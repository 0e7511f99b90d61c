//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::{LogBackend, NotifierBackend, StorefrontConfig};
use crate::core::events::EventBus;
use crate::core::service::{Notifier, OrderLog, SharedLogSource};
use crate::dispatch::{Clock, MessageFormatter, OrderDispatcher};
use crate::notify::{NoopNotifier, RelayNotifier, TelegramClient};
use crate::order_log::OrderLogReader;
use crate::storage::{InMemoryOrderLog, RelayOrderLog, TextFileOrderLog};
use anyhow::{Context, Result};
use axum::Router;
use chrono::FixedOffset;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the storefront HTTP server
///
/// Anything not set explicitly is derived from the configuration.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(StorefrontConfig::default())
///     .with_order_log(InMemoryOrderLog::new())
///     .with_notifier(NoopNotifier)
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: Option<StorefrontConfig>,
    order_log: Option<Arc<dyn OrderLog>>,
    notifier: Option<Arc<dyn Notifier>>,
    telegram: Option<TelegramClient>,
    clock: Option<Clock>,
    custom_routes: Vec<Router>,
    event_bus: Option<EventBus>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            order_log: None,
            notifier: None,
            telegram: None,
            clock: None,
            custom_routes: Vec::new(),
            event_bus: None,
        }
    }

    pub fn with_config(mut self, config: StorefrontConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this log instead of the configured backend
    pub fn with_order_log(mut self, log: impl OrderLog + 'static) -> Self {
        self.order_log = Some(Arc::new(log));
        self
    }

    /// Use this notifier instead of the configured backend
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Bot API client for the Telegram relay route
    pub fn with_telegram_client(mut self, client: TelegramClient) -> Self {
        self.telegram = Some(client);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Use a specific event bus, e.g. to subscribe before the server starts
    ///
    /// Without one, a bus sized by `events.capacity` is created.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn default_order_log(config: &StorefrontConfig) -> Result<Arc<dyn OrderLog>> {
        let log: Arc<dyn OrderLog> = match config.orders.backend {
            LogBackend::File => Arc::new(TextFileOrderLog::new(&config.orders.path)),
            LogBackend::Relay => Arc::new(RelayOrderLog::new(&config.orders.relay_url)?),
            LogBackend::Memory => Arc::new(InMemoryOrderLog::new()),
        };
        Ok(log)
    }

    fn default_notifier(
        config: &StorefrontConfig,
        telegram: &TelegramClient,
    ) -> Result<Arc<dyn Notifier>> {
        let credentials = config.notifier.credentials();
        if config.notifier.backend != NotifierBackend::Disabled && credentials.is_placeholder() {
            tracing::warn!(
                "Telegram credentials are not set; notifications will fail until \
                 TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID are provided"
            );
        }

        let notifier: Arc<dyn Notifier> = match config.notifier.backend {
            NotifierBackend::Direct => Arc::new(telegram.clone().with_credentials(credentials)),
            NotifierBackend::Relay => {
                Arc::new(RelayNotifier::new(&config.notifier.relay_url, credentials)?)
            }
            NotifierBackend::Disabled => Arc::new(NoopNotifier),
        };
        Ok(notifier)
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        let config = self.config.take().unwrap_or_default();
        config.validate()?;

        let telegram = match self.telegram.take() {
            Some(client) => client,
            None => TelegramClient::new(&config.notifier.api_base)?,
        };

        let order_log = match self.order_log.take() {
            Some(log) => log,
            None => Self::default_order_log(&config)?,
        };

        let notifier = match self.notifier.take() {
            Some(notifier) => notifier,
            None => Self::default_notifier(&config, &telegram)?,
        };

        let offset = FixedOffset::east_opt(config.notifier.utc_offset_minutes * 60)
            .context("notifier.utc_offset_minutes is out of range")?;

        let event_bus = self
            .event_bus
            .take()
            .unwrap_or_else(|| EventBus::new(config.events.capacity));

        let mut dispatcher = OrderDispatcher::new(
            notifier,
            order_log.clone(),
            MessageFormatter::with_offset(offset)?,
        )
        .with_event_bus(event_bus.clone());
        if let Some(clock) = self.clock.take() {
            dispatcher = dispatcher.with_clock(clock);
        }

        let reader = OrderLogReader::new(Arc::new(SharedLogSource(order_log.clone())))
            .with_event_bus(event_bus.clone());

        tracing::debug!(
            log_backend = ?config.orders.backend,
            notifier_backend = ?config.notifier.backend,
            "storefront host assembled"
        );

        Ok(ServerHost::new(config, dispatcher, order_log, reader, telegram)
            .with_event_bus(event_bus))
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
