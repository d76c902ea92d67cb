//! Hotel room-service ordering API.
//!
//! Guests browse the menu and place orders against a room. Staff manage
//! availability and prices, move orders across the kitchen board and post
//! delivered orders to the guest folio. KHQR orders carry a signed PayWay
//! checkout payload; the gateway confirms payment through a webhook.
//!
//! The router is exposed as a library so it can be driven in-process by
//! the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    http::{HeaderValue, Method, Request, header},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary around this router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
        .with_state(state)
}

/// Allow the guest/staff frontend origin.
fn cors_layer(state: &AppState) -> CorsLayer {
    let origin = state.config().frontend_url.origin().ascii_serialization();
    let allow_origin = match HeaderValue::from_str(&origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(%origin, "Frontend origin is not a valid header value, CORS disabled");
            AllowOrigin::list([])
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
