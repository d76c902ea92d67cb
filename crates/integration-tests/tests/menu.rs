//! Menu listing and staff menu management.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use roomservice_integration_tests::{TestContext, decimal};

fn find<'a>(menu: &'a Value, name_en: &str) -> &'a Value {
    menu.as_array()
        .unwrap()
        .iter()
        .find(|item| item["nameEn"] == name_en)
        .unwrap()
}

#[tokio::test]
async fn test_menu_lists_seeded_items_with_categories() {
    let ctx = TestContext::new().await;

    let (status, menu) = ctx.get("/api/menu").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu.as_array().unwrap().len(), 6);

    let lok_lak = find(&menu, "Beef Lok Lak");
    assert_eq!(lok_lak["category"], "Main Courses");
    assert_eq!(lok_lak["nameKm"], "ឡុកឡាក់សាច់គោ");
    assert_eq!(decimal(&lok_lak["price"]), Decimal::new(900, 2));
    assert_eq!(lok_lak["available"], true);
    assert!(lok_lak["stockCount"].is_null());
    assert_eq!(lok_lak["purchasable"], true);
}

#[tokio::test]
async fn test_toggle_three_way_stock_change() {
    let ctx = TestContext::new().await;
    let id = ctx.menu_item_id("Fish Amok").await;
    let uri = format!("/api/menu/{id}/toggle");

    let (status, item) = ctx.put(&uri, &json!({ "available": true, "stockCount": 5 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["stockCount"], 5);

    // Absent stockCount keeps the count.
    let (_, item) = ctx.put(&uri, &json!({ "available": false })).await;
    assert_eq!(item["available"], false);
    assert_eq!(item["stockCount"], 5);
    assert_eq!(item["purchasable"], false);

    // Explicit null makes the item unlimited.
    let (_, item) = ctx
        .put(&uri, &json!({ "available": true, "stockCount": null }))
        .await;
    assert_eq!(item["available"], true);
    assert!(item["stockCount"].is_null());
}

#[tokio::test]
async fn test_zero_stock_is_not_purchasable() {
    let ctx = TestContext::new().await;
    let id = ctx.menu_item_id("Iced Latte").await;

    let (_, item) = ctx
        .put(
            &format!("/api/menu/{id}/toggle"),
            &json!({ "available": true, "stockCount": 0 }),
        )
        .await;
    assert_eq!(item["purchasable"], false);

    let (status, _) = ctx.place_order("CASH", &[("Iced Latte", 1)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_rejects_bad_input() {
    let ctx = TestContext::new().await;
    let id = ctx.menu_item_id("Fish Amok").await;

    let (status, body) = ctx
        .put(
            &format!("/api/menu/{id}/toggle"),
            &json!({ "available": true, "stockCount": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_object());

    let (status, _) = ctx
        .put(
            "/api/menu/00000000-0000-4000-8000-000000000000/toggle",
            &json!({ "available": true }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .put("/api/menu/nope/toggle", &json!({ "available": true }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_price_edit_does_not_touch_placed_orders() {
    let ctx = TestContext::new().await;
    let order_id = ctx.place_order_id("CASH", &[("Fish Amok", 2)]).await;
    let item = ctx.menu_item_id("Fish Amok").await;

    let (status, updated) = ctx
        .put(&format!("/api/menu/{item}/price"), &json!({ "price": "10.00" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&updated["price"]), Decimal::new(1000, 2));

    let (_, order) = ctx.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(decimal(&order["items"][0]["priceAtTime"]), Decimal::new(850, 2));
    assert_eq!(decimal(&order["totalUsd"]), Decimal::new(1700, 2));

    let (_, next) = ctx.place_order("CASH", &[("Fish Amok", 1)]).await;
    assert_eq!(decimal(&next["order"]["totalUsd"]), Decimal::new(1000, 2));
}

#[tokio::test]
async fn test_negative_price_rejected() {
    let ctx = TestContext::new().await;
    let item = ctx.menu_item_id("Fish Amok").await;

    let (status, _) = ctx
        .put(&format!("/api/menu/{item}/price"), &json!({ "price": "-1.00" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}
