//! Order routes: place an order, list the log

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::category::{Category, ColorBand};
use crate::core::error::{
    FieldValidationError, RequestError, StoreError, StoreResult, ValidationError,
};
use crate::core::order::OrderDraft;
use crate::dispatch::DispatchOutcome;
use crate::intake::{Notice, NoticeView};
use crate::order_log::LoggedOrder;
use crate::server::host::ServerHost;

const REQUIRED_MESSAGE: &str = "Ce champ est obligatoire";

/// Body of `POST /api/orders`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub draft: OrderDraft,
}

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
    pub notice: NoticeView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    /// "Commande #N"
    pub number: usize,
    #[serde(flatten)]
    pub order: LoggedOrder,
    pub color_band: ColorBand,
}

#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderView>,
    pub count: usize,
}

/// `POST /api/orders`
///
/// 201 when at least one sink accepted the order, 502 when none did.
pub async fn place_order(
    State(host): State<Arc<ServerHost>>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> StoreResult<Response> {
    let Json(request) = body.map_err(|e| RequestError::InvalidBody {
        message: e.body_text(),
    })?;

    let category = match request.category.as_deref() {
        Some(text) if !text.trim().is_empty() => text.parse::<Category>()?,
        _ => Category::default(),
    };

    let missing = request.draft.missing_fields();
    if !missing.is_empty() {
        return Err(StoreError::Validation(ValidationError::FieldErrors(
            missing
                .into_iter()
                .map(|field| FieldValidationError::new(field, REQUIRED_MESSAGE))
                .collect(),
        )));
    }

    let order = request.draft.to_order(category)?;
    let outcome = host.dispatcher.dispatch(order).await;

    let (status, notice) = if outcome.success {
        (
            StatusCode::CREATED,
            Notice::Placed {
                notification_sent: outcome.notification_sent,
            },
        )
    } else {
        (StatusCode::BAD_GATEWAY, Notice::Failed)
    };

    let body = PlaceOrderResponse {
        outcome,
        notice: notice.view(),
    };
    Ok((status, Json(body)).into_response())
}

/// `GET /api/orders`, newest first
pub async fn list_orders(
    State(host): State<Arc<ServerHost>>,
) -> StoreResult<Json<ListOrdersResponse>> {
    let feed = host.reader.load().await?;
    let count = feed.count;

    let orders = feed
        .orders
        .into_iter()
        .enumerate()
        .map(|(index, order)| OrderView {
            number: count - index,
            color_band: order.color_band(),
            order,
        })
        .collect();

    Ok(Json(ListOrdersResponse { orders, count }))
}
