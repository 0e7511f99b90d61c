//! End-to-end tests of the HTTP surface
//!
//! The router is built with in-memory sinks and driven through
//! `axum_test::TestServer`, the way a browser client would call it.

use anyhow::bail;
use axum::http::StatusCode;
use axum_test::TestServer;
use blouza::prelude::*;
use chrono::TimeZone;
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// Test helpers
// =============================================================================

/// Notifier that always delivers
struct AcceptingNotifier;

#[async_trait]
impl Notifier for AcceptingNotifier {
    async fn send(&self, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Log that refuses every write
struct BrokenLog;

#[async_trait]
impl LogSource for BrokenLog {
    async fn contents(&self) -> Result<String> {
        bail!("disk unavailable")
    }
}

#[async_trait]
impl OrderLog for BrokenLog {
    async fn append(&self, _order: &PlacedOrder) -> Result<u64> {
        bail!("disk unavailable")
    }

    async fn overwrite(&self, _content: &str) -> Result<()> {
        bail!("disk unavailable")
    }
}

fn fixed_clock() -> blouza::dispatch::Clock {
    Arc::new(|| Utc.with_ymd_and_hms(2026, 10, 19, 9, 12, 44).unwrap())
}

fn create_test_server(log: InMemoryOrderLog) -> TestServer {
    let app = ServerBuilder::new()
        .with_order_log(log)
        .with_notifier(AcceptingNotifier)
        .with_clock(fixed_clock())
        .build()
        .expect("Failed to build router");
    TestServer::new(app).expect("Failed to create test server")
}

fn order_body(name: &str, category: &str, size: &str) -> Value {
    json!({
        "category": category,
        "fullName": name,
        "phone": "+21611111111",
        "address": "Rue 1, Djerba",
        "size": size,
        "quantity": "2",
        "notes": ""
    })
}

// =============================================================================
// Placing orders
// =============================================================================

mod place_order_tests {
    use super::*;

    #[tokio::test]
    async fn test_place_order_returns_created() {
        let log = InMemoryOrderLog::new();
        let server = create_test_server(log.clone());

        let response = server
            .post("/api/orders")
            .json(&order_body("Ali Ben Salah", "men", "M"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["notificationSent"], true);
        assert_eq!(body["logAppended"], true);
        assert_eq!(body["sequence"], 1);
        assert_eq!(body["notice"]["title"], "Commande envoyée !");

        let text = log.contents().await.unwrap();
        assert!(text.contains("Nom: Ali Ben Salah\n"));
        assert!(text.contains("Catégorie: Blouza Homme\n"));
        assert!(text.contains("Quantité: 2\n"));
        assert!(text.contains("Notes: Aucune\n"));
    }

    #[tokio::test]
    async fn test_numeric_quantity_is_accepted() {
        let server = create_test_server(InMemoryOrderLog::new());
        let mut body = order_body("Hela", "women", "S");
        body["quantity"] = json!(3);

        let response = server.post("/api/orders").json(&body).await;
        response.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_missing_fields_are_listed() {
        let log = InMemoryOrderLog::new();
        let server = create_test_server(log.clone());

        let response = server
            .post("/api/orders")
            .json(&json!({ "category": "men", "fullName": "Ali" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let fields: Vec<&str> = body["details"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["phone", "address", "size"]);
        assert_eq!(log.contents().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_size_from_other_category_is_rejected() {
        let server = create_test_server(InMemoryOrderLog::new());

        let response = server
            .post("/api/orders")
            .json(&order_body("Karim", "kids", "XL"))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_category_is_bad_request() {
        let server = create_test_server(InMemoryOrderLog::new());

        let response = server
            .post("/api/orders")
            .json(&order_body("Ali", "babies", "M"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_json_body_is_bad_request() {
        let server = create_test_server(InMemoryOrderLog::new());

        let response = server.post("/api/orders").text("fullName=Ali").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_both_sinks_down_is_bad_gateway() {
        let app = ServerBuilder::new()
            .with_order_log(BrokenLog)
            .with_notifier(NoopNotifier)
            .build()
            .unwrap();
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/orders")
            .json(&order_body("Ali", "men", "M"))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["notice"]["title"], "Erreur");
        assert_eq!(body["notice"]["variant"], "destructive");
        assert!(body.get("sequence").is_none());
    }

    #[tokio::test]
    async fn test_log_alone_is_enough() {
        let app = ServerBuilder::new()
            .with_order_log(InMemoryOrderLog::new())
            .with_notifier(NoopNotifier)
            .build()
            .unwrap();
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/orders")
            .json(&order_body("Ali", "men", "M"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["notificationSent"], false);
        assert_eq!(
            body["notice"]["description"],
            "Votre commande a été enregistrée."
        );
    }
}

// =============================================================================
// Reading the log
// =============================================================================

mod list_orders_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_log_lists_nothing() {
        let server = create_test_server(InMemoryOrderLog::new());

        let response = server.get("/api/orders").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 0);
        assert_eq!(body["orders"], json!([]));
    }

    #[tokio::test]
    async fn test_orders_are_listed_newest_first() {
        let server = create_test_server(InMemoryOrderLog::new());
        for (name, category, size) in [
            ("Ali", "men", "M"),
            ("Hela", "women", "S"),
            ("Karim", "kids", "7-9 ans"),
        ] {
            server
                .post("/api/orders")
                .json(&order_body(name, category, size))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get("/api/orders").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 3);

        let orders = body["orders"].as_array().unwrap();
        assert_eq!(orders[0]["fullName"], "Karim");
        assert_eq!(orders[0]["number"], 3);
        assert_eq!(orders[0]["colorBand"], "green");
        assert_eq!(orders[1]["fullName"], "Hela");
        assert_eq!(orders[1]["colorBand"], "pink");
        assert_eq!(orders[2]["fullName"], "Ali");
        assert_eq!(orders[2]["number"], 1);
        assert_eq!(orders[2]["colorBand"], "blue");
        assert_eq!(orders[2]["category"], "Blouza Homme");
        assert_eq!(orders[2]["timestamp"], "2026-10-19T09:12:44.000Z");
    }

    #[tokio::test]
    async fn test_unreadable_log_is_unavailable() {
        let app = ServerBuilder::new()
            .with_order_log(BrokenLog)
            .with_notifier(NoopNotifier)
            .build()
            .unwrap();
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/orders").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_orders_text_serves_raw_log() {
        let log = InMemoryOrderLog::with_contents("Date: x\nNom: Test\n\n---");
        let server = create_test_server(log);

        let response = server.get("/orders.txt").await;

        response.assert_status_ok();
        assert_eq!(response.text(), "Date: x\nNom: Test\n\n---");
        let content_type = response.header("content-type");
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_orders_text_read_failure_is_not_found() {
        let app = ServerBuilder::new()
            .with_order_log(BrokenLog)
            .with_notifier(NoopNotifier)
            .build()
            .unwrap();
        let server = TestServer::new(app).unwrap();

        server.get("/orders.txt").await.assert_status_not_found();
    }
}

// =============================================================================
// Relay routes
// =============================================================================

mod relay_route_tests {
    use super::*;

    #[tokio::test]
    async fn test_relay_routes_reject_other_methods() {
        let server = create_test_server(InMemoryOrderLog::new());

        for path in ["/api/telegram", "/api/update-orders"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
            let body: Value = response.json();
            assert_eq!(body, json!({ "error": "Method not allowed" }));

            server
                .put(path)
                .await
                .assert_status(StatusCode::METHOD_NOT_ALLOWED);
        }
    }

    #[tokio::test]
    async fn test_update_orders_replaces_log() {
        let log = InMemoryOrderLog::with_contents("old text");
        let server = create_test_server(log.clone());

        let response = server
            .post("/api/update-orders")
            .json(&json!({ "content": "Date: x\nNom: Nouveau\n\n---" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({ "success": true }));
        assert_eq!(log.contents().await.unwrap(), "Date: x\nNom: Nouveau\n\n---");

        let listed: Value = server.get("/api/orders").await.json();
        assert_eq!(listed["orders"][0]["fullName"], "Nouveau");
    }

    #[tokio::test]
    async fn test_update_orders_without_content_fails() {
        let log = InMemoryOrderLog::with_contents("kept");
        let server = create_test_server(log.clone());

        let response = server
            .post("/api/update-orders")
            .json(&json!({ "text": "wrong field" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"], "Failed to update orders file");
        assert_eq!(log.contents().await.unwrap(), "kept");
    }

    #[tokio::test]
    async fn test_telegram_relay_with_bad_body_fails() {
        let server = create_test_server(InMemoryOrderLog::new());

        let response = server
            .post("/api/telegram")
            .json(&json!({ "message": "salut" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"], "Failed to send Telegram message");
        assert!(body["details"].is_string());
    }
}

// =============================================================================
// Catalog and health
// =============================================================================

mod catalog_tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_lists_three_products() {
        let server = create_test_server(InMemoryOrderLog::new());

        let response = server.get("/api/catalog").await;

        response.assert_status_ok();
        let body: Value = response.json();
        let categories: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["category"].as_str())
            .collect();
        assert_eq!(categories, vec!["men", "women", "kids"]);
        assert_eq!(body[0]["priceLabel"], "85 DT");
    }

    #[tokio::test]
    async fn test_single_product() {
        let server = create_test_server(InMemoryOrderLog::new());

        let body: Value = server.get("/api/catalog/kids").await.json();
        assert_eq!(body["sizes"], json!(["4-6 ans", "7-9 ans", "10-12 ans", "13-15 ans"]));

        server
            .get("/api/catalog/babies")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_size_guides() {
        let server = create_test_server(InMemoryOrderLog::new());

        let response = server.get("/api/catalog/women/size-guide").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["title"], "Guide des tailles - Blouza Femme");
        assert_eq!(body["rows"].as_array().unwrap().len(), 4);

        server
            .get("/api/catalog/kids/size-guide")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_health_through_tower_service() {
        use axum::body::{Body, to_bytes};
        use axum::http::Request;
        use tower::ServiceExt;

        let app = ServerBuilder::new()
            .with_order_log(InMemoryOrderLog::new())
            .with_notifier(NoopNotifier)
            .build()
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "ok", "service": "blouza-orders" }));
    }
}
