//! Relay routes
//!
//! `/api/telegram` forwards a pre-formatted message to the Bot API so the
//! token never has to be called from a browser; `/api/update-orders`
//! replaces the whole log text. Both accept POST only and answer any other
//! method with 405 `{"error":"Method not allowed"}`. Response bodies keep
//! the plain `{error, details}` shape that existing clients parse.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::core::events::OrderEvent;
use crate::notify::{TelegramCredentials, TelegramRelayRequest};
use crate::server::host::ServerHost;

/// Body of `POST /api/update-orders`
#[derive(Debug, Deserialize)]
pub struct UpdateOrdersRequest {
    pub content: String,
}

/// Any method other than POST on a relay route
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

fn send_failed(details: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Failed to send Telegram message",
            "details": details,
        })),
    )
        .into_response()
}

/// `POST /api/telegram`
pub async fn relay_telegram(
    State(host): State<Arc<ServerHost>>,
    body: Result<Json<TelegramRelayRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => return send_failed(e.body_text()),
    };

    let credentials = TelegramCredentials::new(request.bot_token, request.chat_id);
    match host.telegram.send_message(&credentials, &request.message).await {
        Ok(reply) if reply.is_ok() => (
            StatusCode::OK,
            Json(json!({ "success": true, "result": reply.body })),
        )
            .into_response(),
        Ok(reply) => {
            tracing::warn!(status = reply.status, "Telegram API rejected relayed message");
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                Json(json!({ "error": "Telegram API error", "details": reply.body })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Telegram relay transport failure");
            send_failed(e.to_string())
        }
    }
}

/// `POST /api/update-orders`
pub async fn update_orders(
    State(host): State<Arc<ServerHost>>,
    body: Result<Json<UpdateOrdersRequest>, JsonRejection>,
) -> Response {
    let failed = || {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update orders file" })),
        )
            .into_response()
    };

    let Ok(Json(request)) = body else {
        return failed();
    };

    if let Err(e) = host.order_log.overwrite(&request.content).await {
        tracing::error!(error = %e, "failed to overwrite order log");
        return failed();
    }

    if let Some(bus) = host.event_bus() {
        bus.publish(OrderEvent::LogRewritten);
    }

    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

/// `GET /orders.txt`
pub async fn orders_text(State(host): State<Arc<ServerHost>>) -> Response {
    match host.order_log.contents().await {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read order log");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
