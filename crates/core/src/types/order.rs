//! Order records.
//!
//! An order and its lines are written once, together. Afterwards only the
//! status and the folio-posted flag change; line prices are frozen at the
//! moment of creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MenuItemId, OrderId, OrderItemId, RestaurantId};
use super::menu::MenuItem;
use super::money::line_total;
use super::status::{OrderStatus, PaymentMethod};

/// Room label used when the guest does not give one.
pub const WALK_IN_ROOM: &str = "Walk-in";

/// Largest quantity a single order line may carry.
pub const MAX_LINE_QUANTITY: i32 = 999;

/// Largest number of lines in one order.
pub const MAX_ORDER_LINES: usize = 100;

/// Largest order total the ledger can store (`NUMERIC(10, 2)`): 99999999.99.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Human-facing order number for an order created at `created_at`.
///
/// `ORD-` followed by the last six digits of the epoch-millisecond timestamp.
/// Not unique: two orders created exactly 1000 seconds apart (or in the same
/// millisecond) share a number. The order id is the real identity.
#[must_use]
pub fn order_number_at(created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis().rem_euclid(1_000_000);
    format!("ORD-{millis:06}")
}

/// A `(menu item, quantity)` pair requested by a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedLine {
    pub menu_item_id: MenuItemId,
    pub quantity: i32,
}

/// A priced line ready to be written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub menu_item_id: MenuItemId,
    pub quantity: i32,
    /// Catalog unit price captured at order time.
    pub price_at_time: Decimal,
}

/// Everything the ledger needs to create an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub room_id: String,
    pub total_usd: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub guest_name: Option<String>,
    pub special_requests: Option<String>,
    pub restaurant_id: RestaurantId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<NewOrderLine>,
}

/// One guest transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub room_id: String,
    pub total_usd: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub is_posted_to_folio: bool,
    pub guest_name: Option<String>,
    pub special_requests: Option<String>,
    pub restaurant_id: RestaurantId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of `priceAtTime * quantity` over the order's lines.
    #[must_use]
    pub fn lines_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| line_total(item.price_at_time, item.quantity))
            .sum()
    }
}

/// An immutable line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub quantity: i32,
    pub price_at_time: Decimal,
    /// Joined catalog record, populated on reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item: Option<MenuItem>,
}
