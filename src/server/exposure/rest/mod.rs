//! REST API exposure
//!
//! Consumes a `ServerHost` and produces an Axum `Router` with the JSON API,
//! the relay routes, the raw log, and health checks.

pub mod catalog;
pub mod orders;

use super::super::host::ServerHost;
use crate::server::router::build_relay_routes;
use anyhow::Result;
use axum::{
    Json, Router,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the router from a host
    ///
    /// Custom routes are merged last and may not reuse an existing path.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes()
            .merge(Self::api_routes(host.clone()))
            .merge(build_relay_routes(host));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()))
    }

    fn api_routes(host: Arc<ServerHost>) -> Router {
        Router::new()
            .route(
                "/api/orders",
                get(orders::list_orders).post(orders::place_order),
            )
            .route("/api/catalog", get(catalog::list_products))
            .route("/api/catalog/{category}", get(catalog::get_product))
            .route(
                "/api/catalog/{category}/size-guide",
                get(catalog::get_size_guide),
            )
            .with_state(host)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "blouza-orders"
        }))
    }
}
