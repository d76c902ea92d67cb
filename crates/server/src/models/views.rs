//! Response bodies.

use rust_decimal::Decimal;
use serde::Serialize;

use roomservice_core::{MenuEntry, MenuItemId};

/// Menu item as the guest app and the staff toggle see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    pub id: MenuItemId,
    pub name_en: String,
    pub name_km: String,
    pub price: Decimal,
    /// Category name (English).
    pub category: String,
    pub image_url: Option<String>,
    pub available: bool,
    pub stock_count: Option<i32>,
    pub purchasable: bool,
}

impl From<MenuEntry> for MenuItemView {
    fn from(entry: MenuEntry) -> Self {
        let purchasable = entry.item.is_purchasable();
        Self {
            id: entry.item.id,
            name_en: entry.item.name_en,
            name_km: entry.item.name_km,
            price: entry.item.price,
            category: entry.category,
            image_url: entry.item.image_url,
            available: entry.item.available,
            stock_count: entry.item.stock_count,
            purchasable,
        }
    }
}

/// Acknowledgement sent to the payment gateway for every callback.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

impl WebhookAck {
    pub const OK: Self = Self { status: "OK" };
}
