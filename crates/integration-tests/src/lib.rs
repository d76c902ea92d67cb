//! Integration tests for the room-service API.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`
//! against the in-memory backend, seeded with the demo menu. No database or
//! running server is needed.
//!
//! ```bash
//! cargo test -p roomservice-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use roomservice_server::app;
use roomservice_server::config::{NotificationConfig, PaywayConfig, ServerConfig};
use roomservice_server::db::{MemoryStore, seed::seed_demo_catalog};
use roomservice_server::state::AppState;

/// Merchant id used by [`TestContext::with_payway`].
pub const TEST_MERCHANT_ID: &str = "ec462423";

/// Signing key used by [`TestContext::with_payway`].
pub const TEST_API_KEY: &str = "k9Vq2mT7xR4pL8wZ3nB6yH1cF5jD0sGa";

/// Relay target nothing listens on (the discard port).
pub const UNREACHABLE_RELAY: &str = "http://127.0.0.1:9/";

/// A seeded in-memory application.
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    /// Application with no gateway credentials (simulated KHQR).
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::in_memory()).await
    }

    /// Application with gateway credentials, so KHQR orders are signed.
    pub async fn with_payway() -> Self {
        let mut config = ServerConfig::in_memory();
        config.payway = PaywayConfig {
            merchant_id: Some(TEST_MERCHANT_ID.to_string()),
            api_key: Some(SecretString::from(TEST_API_KEY)),
        };
        Self::with_config(config).await
    }

    /// Application whose Telegram and WhatsApp relays cannot be reached.
    pub async fn with_unreachable_relays() -> Self {
        let relay = Url::parse(UNREACHABLE_RELAY).expect("Invalid relay URL");
        let mut config = ServerConfig::in_memory();
        config.notifications = NotificationConfig {
            telegram_webhook_url: Some(relay.clone()),
            whatsapp_webhook_url: Some(relay),
        };
        Self::with_config(config).await
    }

    async fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        seed_demo_catalog(store.as_ref())
            .await
            .expect("Failed to seed demo catalog");

        let state = AppState::new(config, store.clone(), store.clone())
            .expect("Failed to build application state");

        Self {
            app: app(state),
            store,
        }
    }

    /// Send a request and return the status and JSON body (`Null` if empty or not JSON).
    pub async fn request(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&body.to_string())).await
    }

    pub async fn put(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(&body.to_string())).await
    }

    /// Id of a seeded menu item by English name.
    pub async fn menu_item_id(&self, name_en: &str) -> String {
        let (_, menu) = self.get("/api/menu").await;
        menu.as_array()
            .into_iter()
            .flatten()
            .find(|item| item["nameEn"] == name_en)
            .and_then(|item| item["id"].as_str())
            .unwrap_or_else(|| panic!("menu item {name_en} not seeded"))
            .to_string()
    }

    /// Place an order and return the `(status, body)` pair.
    pub async fn place_order(&self, method: &str, lines: &[(&str, i32)]) -> (StatusCode, Value) {
        let mut items = Vec::new();
        for (name, quantity) in lines {
            items.push(serde_json::json!({
                "menuItemId": self.menu_item_id(name).await,
                "quantity": quantity,
            }));
        }

        self.post(
            "/api/orders",
            &serde_json::json!({
                "roomId": "Room 101",
                "paymentMethod": method,
                "guestName": "Dara",
                "items": items,
            }),
        )
        .await
    }

    /// Place an order that must succeed and return the order id.
    pub async fn place_order_id(&self, method: &str, lines: &[(&str, i32)]) -> String {
        let (status, body) = self.place_order(method, lines).await;
        assert_eq!(status, StatusCode::CREATED, "order rejected: {body}");
        body["order"]["id"]
            .as_str()
            .expect("order id in response")
            .to_string()
    }

    /// Set an order's status through the API.
    pub async fn set_status(&self, order_id: &str, status: &str) -> (StatusCode, Value) {
        self.put(
            &format!("/api/orders/{order_id}/status"),
            &serde_json::json!({ "status": status }),
        )
        .await
    }
}

/// Parse a decimal string field, e.g. `"12.00"`.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a decimal string: {value}"))
}
