//! Authoritative order pricing.
//!
//! Unit prices always come from the catalog. Requests carry only item ids and
//! quantities; a client-side price has nowhere to go.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use roomservice_core::{
    MAX_LINE_QUANTITY, MAX_ORDER_TOTAL, MenuItem, MenuItemId, NewOrderLine, RequestedLine,
    line_total,
};

use super::ordering::OrderError;
use crate::db::CatalogStore;

/// A line priced against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub menu_item_id: MenuItemId,
    pub quantity: i32,
    pub price_at_time: Decimal,
    pub name_en: String,
}

impl From<&PricedLine> for NewOrderLine {
    fn from(line: &PricedLine) -> Self {
        Self {
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            price_at_time: line.price_at_time,
        }
    }
}

/// Result of pricing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub total: Decimal,
    /// Lines in request order.
    pub lines: Vec<PricedLine>,
}

/// Price `lines` against `items`.
///
/// Lines are checked in order and the first failure aborts. The stock check
/// compares each line on its own, so two lines for the same item are not
/// summed.
///
/// # Errors
///
/// Returns `OrderError::QuantityOutOfRange` for a quantity outside
/// `1..=MAX_LINE_QUANTITY`, `OrderError::ItemUnavailable` for unknown or
/// switched-off items, `OrderError::InsufficientStock` when a finite stock
/// count is below the requested quantity and `OrderError::TotalTooLarge` when
/// the total does not fit the ledger.
pub fn price_lines(
    items: &HashMap<MenuItemId, MenuItem>,
    lines: &[RequestedLine],
) -> Result<PricedOrder, OrderError> {
    let mut total = Decimal::ZERO;
    let mut priced = Vec::with_capacity(lines.len());

    for line in lines {
        if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
            return Err(OrderError::QuantityOutOfRange(line.quantity));
        }

        let item = items
            .get(&line.menu_item_id)
            .filter(|item| item.available)
            .ok_or(OrderError::ItemUnavailable(line.menu_item_id))?;

        if !item.has_stock_for(line.quantity) {
            return Err(OrderError::InsufficientStock(item.name_en.clone()));
        }

        total += line_total(item.price, line.quantity);
        priced.push(PricedLine {
            menu_item_id: item.id,
            quantity: line.quantity,
            price_at_time: item.price,
            name_en: item.name_en.clone(),
        });
    }

    if total > MAX_ORDER_TOTAL {
        return Err(OrderError::TotalTooLarge);
    }

    Ok(PricedOrder {
        total,
        lines: priced,
    })
}

/// Look up every requested item and price the request.
///
/// Reads only; stock is not decremented.
///
/// # Errors
///
/// Returns the pricing errors of [`price_lines`], or `OrderError::Persistence`
/// if the catalog cannot be read.
pub async fn price_order(
    catalog: &dyn CatalogStore,
    lines: &[RequestedLine],
) -> Result<PricedOrder, OrderError> {
    let mut items = HashMap::with_capacity(lines.len());
    for line in lines {
        if items.contains_key(&line.menu_item_id) {
            continue;
        }
        if let Some(item) = catalog.get_menu_item(line.menu_item_id).await? {
            items.insert(item.id, item);
        }
    }

    price_lines(&items, lines)
}
