//! # Blouza Orders
//!
//! Order pipeline of the Blouza Djerba storefront: customers fill an order
//! form, each order is sent to a Telegram chat and appended to a plain text
//! log, and staff read the log back as a list of order cards.
//!
//! ## Features
//!
//! - **Order Intake**: draft state, required-field check, timed reset
//! - **Dispatch**: fan-out to the notifier and the log; an order is placed
//!   when at least one of them accepted it
//! - **Order Log**: append-only text format, schema-on-read parsing, newest first
//! - **Relay Routes**: `/api/telegram` and `/api/update-orders`, as used by
//!   browser clients
//! - **Catalog**: the three products and their size guides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blouza::prelude::*;
//!
//! let config = StorefrontConfig::default().with_env_overrides();
//! ServerBuilder::new()
//!     .with_config(config)
//!     .serve("0.0.0.0:8080")
//!     .await?;
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod intake;
pub mod notify;
pub mod order_log;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        category::{Category, ColorBand},
        error::{StoreError, StoreResult, ValidationError},
        events::{EventBus, OrderEvent},
        order::{DraftField, Order, OrderDraft, PlacedOrder},
        service::{LogSource, Notifier, OrderLog},
    };

    // === Pipeline ===
    pub use crate::dispatch::{DispatchOutcome, MessageFormatter, OrderDispatcher};
    pub use crate::intake::{Notice, OrderIntake, Phase, ResetPolicy};
    pub use crate::order_log::{FeedState, LoggedOrder, OrderFeed, OrderLogReader};

    // === Sinks ===
    pub use crate::notify::{NoopNotifier, RelayNotifier, TelegramClient, TelegramCredentials};
    pub use crate::storage::{HttpLogSource, InMemoryOrderLog, RelayOrderLog, TextFileOrderLog};

    // === Config ===
    pub use crate::config::StorefrontConfig;

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
}
