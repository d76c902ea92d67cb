//! Menu route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

use roomservice_core::MenuItemId;

use super::parse_id;
use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::models::{MenuItemView, ToggleAvailabilityRequest, UpdatePriceRequest};
use crate::state::AppState;

/// Menu with category names.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<MenuItemView>>> {
    let menu = state.catalog().list_menu().await?;
    Ok(Json(menu.into_iter().map(MenuItemView::from).collect()))
}

/// Switch an item on or off, optionally changing its stock.
#[instrument(skip(state, body))]
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<ToggleAvailabilityRequest>,
) -> Result<Json<MenuItemView>> {
    let id: MenuItemId = parse_id(&id, "Menu item")?;
    let entry = state
        .catalog()
        .set_availability(id, body.available, body.stock_change())
        .await?;

    info!(
        item = %entry.item.name_en,
        available = entry.item.available,
        stock_count = ?entry.item.stock_count,
        "Menu item toggled"
    );
    Ok(Json(entry.into()))
}

/// Change an item's catalog price.
#[instrument(skip(state, body))]
pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdatePriceRequest>,
) -> Result<Json<MenuItemView>> {
    let id: MenuItemId = parse_id(&id, "Menu item")?;
    let price = roomservice_core::round_currency(body.price);
    let entry = state.catalog().set_price(id, price).await?;

    info!(item = %entry.item.name_en, %price, "Menu price updated");
    Ok(Json(entry.into()))
}
