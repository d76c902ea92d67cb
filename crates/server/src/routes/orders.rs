//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use roomservice_core::{Order, OrderId};

use super::parse_id;
use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::models::{CreateOrderRequest, UpdateStatusRequest};
use crate::services::{KitchenBoard, PlacedOrder, build_board};
use crate::state::AppState;

/// Place an order. Responds `201` with `{order, abaData}`.
#[instrument(skip(state, body), fields(method = %body.payment_method))]
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let placed = state.orders().place_order(body.into()).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// All orders, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_orders().await?))
}

/// Kitchen dashboard columns.
#[instrument(skip(state))]
pub async fn board(State(state): State<AppState>) -> Result<Json<KitchenBoard>> {
    let orders = state.orders().list_orders().await?;
    Ok(Json(build_board(&orders)))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    Ok(Json(state.orders().get_order(id).await?))
}

/// Set an order's status. Any status is accepted from any status.
#[instrument(skip(state, body), fields(status = %body.status))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let order = state
        .orders()
        .update_status(id, body.status, body.is_posted_to_folio)
        .await?;
    Ok(Json(order))
}
