//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (storage reachable)
//!
//! # Menu
//! GET  /api/menu                    - Menu with category names
//! PUT  /api/menu/{id}/toggle        - Availability and stock
//! PUT  /api/menu/{id}/price         - Catalog price edit
//!
//! # Orders
//! POST /api/orders                  - Place an order
//! GET  /api/orders                  - All orders, newest first
//! GET  /api/orders/board            - Kitchen dashboard
//! GET  /api/orders/{id}             - One order
//! PUT  /api/orders/{id}/status      - Status (and folio flag)
//!
//! # Integrations
//! POST /api/webhooks/{gateway}      - Payment gateway callback (always 200)
//! POST /api/pms/folio               - Post a delivered order to the folio
//! ```

pub mod health;
pub mod menu;
pub mod orders;
pub mod pms;
pub mod webhooks;

use std::str::FromStr;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the menu routes router.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::index))
        .route("/{id}/toggle", put(menu::toggle))
        .route("/{id}/price", put(menu::update_price))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/board", get(orders::board))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/menu", menu_routes())
        .nest("/api/orders", order_routes())
        .route("/api/webhooks/{gateway}", post(webhooks::gateway_callback))
        .route("/api/pms/folio", post(pms::post_to_folio))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Parse a path id. A malformed id cannot name a record, so it is a 404.
fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(what.to_string()))
}
