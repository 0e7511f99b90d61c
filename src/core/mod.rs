//! Core types and traits of the order pipeline

pub mod category;
pub mod error;
pub mod events;
pub mod order;
pub mod service;

pub use category::{Category, ColorBand};
pub use error::{StoreError, StoreResult};
pub use events::{EventBus, EventEnvelope, OrderEvent};
pub use order::{DraftField, Order, OrderDraft, PlacedOrder};
pub use service::{LogSource, Notifier, OrderLog, SharedLogSource};
