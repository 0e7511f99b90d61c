//! Router builder utilities for the relay routes

use crate::server::host::ServerHost;
use crate::server::relay::{
    method_not_allowed, orders_text, relay_telegram, update_orders,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Build the relay routes
///
/// - POST /api/telegram - forward a message to the Bot API
/// - POST /api/update-orders - replace the order log text
/// - GET /orders.txt - the order log as plain text
pub fn build_relay_routes(host: Arc<ServerHost>) -> Router {
    Router::new()
        .route(
            "/api/telegram",
            post(relay_telegram).fallback(method_not_allowed),
        )
        .route(
            "/api/update-orders",
            post(update_orders).fallback(method_not_allowed),
        )
        .route("/orders.txt", get(orders_text))
        .with_state(host)
}
