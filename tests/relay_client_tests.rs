//! Outbound HTTP clients against live local servers
//!
//! A fake Bot API and real storefront routers are bound to ephemeral ports,
//! and the reqwest-based sinks talk to them over TCP.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use blouza::core::error::NotificationError;
use blouza::prelude::*;
use chrono::TimeZone;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// =============================================================================
// Local servers
// =============================================================================

#[derive(Clone, Default)]
struct FakeBotApi {
    /// (path token, payload) of every sendMessage call
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeBotApi {
    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

async fn send_message(
    State(api): State<FakeBotApi>,
    Path(token): Path<String>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    api.calls.lock().unwrap().push((token, payload.clone()));

    if payload["chat_id"] == "bad" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "description": "Bad Request: chat not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "ok": true, "result": { "message_id": 7 } })),
    )
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Returns the fake Bot API base URL
async fn spawn_bot_api(api: FakeBotApi) -> String {
    let app = Router::new()
        .route("/{token}/sendMessage", post(send_message))
        .with_state(api);
    spawn(app).await
}

/// Storefront whose relay route forwards to `bot_api`
async fn spawn_storefront(bot_api: &str, log: impl OrderLog + 'static) -> String {
    let app = ServerBuilder::new()
        .with_order_log(log)
        .with_notifier(NoopNotifier)
        .with_telegram_client(TelegramClient::new(bot_api).unwrap())
        .build()
        .unwrap();
    spawn(app).await
}

fn credentials(chat_id: &str) -> TelegramCredentials {
    TelegramCredentials::new("123:abc", chat_id)
}

fn placed(name: &str) -> PlacedOrder {
    PlacedOrder::new(
        Order {
            full_name: name.to_string(),
            phone: "+21611111111".to_string(),
            address: "Houmt Souk".to_string(),
            category: Category::Women,
            size: "M".to_string(),
            quantity: 1,
            notes: None,
        },
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
    )
}

// =============================================================================
// Direct Bot API client
// =============================================================================

mod telegram_client_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_message_posts_html_payload() {
        let api = FakeBotApi::default();
        let base = spawn_bot_api(api.clone()).await;
        let client = TelegramClient::new(&base).unwrap();

        let reply = client
            .send_message(&credentials("-1001"), "<b>Bonjour</b>")
            .await
            .unwrap();

        assert!(reply.is_ok());
        assert_eq!(reply.body["result"]["message_id"], 7);

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "bot123:abc");
        assert_eq!(
            calls[0].1,
            json!({ "chat_id": "-1001", "text": "<b>Bonjour</b>", "parse_mode": "HTML" })
        );
    }

    #[tokio::test]
    async fn test_rejection_is_a_reply_not_an_error() {
        let base = spawn_bot_api(FakeBotApi::default()).await;
        let client = TelegramClient::new(&base).unwrap();

        let reply = client
            .send_message(&credentials("bad"), "test")
            .await
            .unwrap();

        assert_eq!(reply.status, 400);
        assert_eq!(reply.description(), "Bad Request: chat not found");
    }

    #[tokio::test]
    async fn test_notifier_maps_rejection_to_error() {
        let base = spawn_bot_api(FakeBotApi::default()).await;
        let notifier = TelegramClient::new(&base)
            .unwrap()
            .with_credentials(credentials("bad"));

        let err = notifier.send("test").await.unwrap_err();

        match err.downcast_ref::<NotificationError>() {
            Some(NotificationError::Rejected { status, message }) => {
                assert_eq!(*status, 400);
                assert_eq!(message, "Bad Request: chat not found");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notifier_without_credentials_is_disabled() {
        let api = FakeBotApi::default();
        let base = spawn_bot_api(api.clone()).await;
        let notifier = TelegramClient::new(&base).unwrap();

        let err = notifier.send("test").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<NotificationError>(),
            Some(NotificationError::Disabled)
        ));
        assert!(api.calls().is_empty());
    }
}

// =============================================================================
// Relay notifier through a storefront
// =============================================================================

mod relay_notifier_tests {
    use super::*;

    #[tokio::test]
    async fn test_relay_forwards_message_and_credentials() {
        let api = FakeBotApi::default();
        let bot_api = spawn_bot_api(api.clone()).await;
        let storefront = spawn_storefront(&bot_api, InMemoryOrderLog::new()).await;

        let notifier = RelayNotifier::new(&storefront, credentials("-1001")).unwrap();
        notifier.send("🆕 <b>Commande</b>").await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "bot123:abc");
        assert_eq!(calls[0].1["chat_id"], "-1001");
        assert_eq!(calls[0].1["text"], "🆕 <b>Commande</b>");
    }

    #[tokio::test]
    async fn test_relay_surfaces_upstream_rejection() {
        let bot_api = spawn_bot_api(FakeBotApi::default()).await;
        let storefront = spawn_storefront(&bot_api, InMemoryOrderLog::new()).await;

        let notifier = RelayNotifier::new(&storefront, credentials("bad")).unwrap();
        let err = notifier.send("test").await.unwrap_err();

        match err.downcast_ref::<NotificationError>() {
            Some(NotificationError::Rejected { status, message }) => {
                assert_eq!(*status, 400);
                assert_eq!(message, "Telegram API error");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = RelayNotifier::new(&format!("http://{addr}"), credentials("-1")).unwrap();
        let err = notifier.send("test").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<NotificationError>(),
            Some(NotificationError::Transport { .. })
        ));
    }
}

// =============================================================================
// Order log through the relay routes
// =============================================================================

mod relay_log_tests {
    use super::*;
    use blouza::order_log::parse_log;

    #[tokio::test]
    async fn test_relay_log_appends_to_remote_log() {
        let bot_api = spawn_bot_api(FakeBotApi::default()).await;
        let remote = InMemoryOrderLog::new();
        let storefront = spawn_storefront(&bot_api, remote.clone()).await;

        let log = RelayOrderLog::new(&storefront).unwrap();
        assert_eq!(log.append(&placed("Amira")).await.unwrap(), 1);
        assert_eq!(log.append(&placed("Yassine")).await.unwrap(), 2);

        let remote_text = remote.contents().await.unwrap();
        assert_eq!(log.contents().await.unwrap(), remote_text);

        let names: Vec<_> = parse_log(&remote_text)
            .into_iter()
            .filter_map(|o| o.full_name)
            .collect();
        assert_eq!(names, vec!["Yassine", "Amira"]);
    }

    #[tokio::test]
    async fn test_missing_remote_log_counts_as_empty() {
        use axum::routing::get;
        use blouza::order_log::format_block;

        let pushed: Arc<Mutex<Vec<String>>> = Arc::default();
        let app = Router::new()
            .route("/orders.txt", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/api/update-orders",
                post(
                    |State(pushed): State<Arc<Mutex<Vec<String>>>>, Json(body): Json<Value>| async move {
                        let content = body["content"].as_str().unwrap_or_default().to_string();
                        pushed.lock().unwrap().push(content);
                        Json(json!({ "success": true }))
                    },
                ),
            )
            .with_state(pushed.clone());
        let base = spawn(app).await;

        let order = placed("Amira");
        let log = RelayOrderLog::new(&base).unwrap();
        assert_eq!(log.append(&order).await.unwrap(), 1);

        let pushed = pushed.lock().unwrap().clone();
        assert_eq!(pushed, vec![format!("\n\n{}", format_block(&order))]);
    }

    #[tokio::test]
    async fn test_relay_log_overwrite() {
        let bot_api = spawn_bot_api(FakeBotApi::default()).await;
        let remote = InMemoryOrderLog::with_contents("ancien");
        let storefront = spawn_storefront(&bot_api, remote.clone()).await;

        RelayOrderLog::new(&format!("{storefront}/"))
            .unwrap()
            .overwrite("")
            .await
            .unwrap();

        assert_eq!(remote.contents().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_http_source_reads_published_log() {
        let bot_api = spawn_bot_api(FakeBotApi::default()).await;
        let remote = InMemoryOrderLog::new();
        remote.append(&placed("Amira")).await.unwrap();
        let storefront = spawn_storefront(&bot_api, remote).await;

        let reader = OrderLogReader::new(Arc::new(
            HttpLogSource::new(format!("{storefront}/orders.txt")).unwrap(),
        ));
        let feed = reader.load().await.unwrap();

        assert_eq!(feed.count, 1);
        assert_eq!(feed.orders[0].category.as_deref(), Some("Blouza Femme"));
    }

    #[tokio::test]
    async fn test_http_source_non_ok_is_error() {
        let bot_api = spawn_bot_api(FakeBotApi::default()).await;
        let storefront = spawn_storefront(&bot_api, InMemoryOrderLog::new()).await;

        let source = HttpLogSource::new(format!("{storefront}/missing.txt")).unwrap();
        assert!(source.contents().await.is_err());

        let reader = OrderLogReader::new(Arc::new(source));
        let err = reader.load().await.unwrap_err();
        assert_eq!(err.error_code(), "ORDER_LOG_UNAVAILABLE");
    }
}
