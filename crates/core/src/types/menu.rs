//! Catalog records: restaurant, categories and menu items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, MenuItemId, RestaurantId};

/// The single tenant a deployment serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A named grouping of menu items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub restaurant_id: RestaurantId,
    pub name_en: String,
    pub name_km: String,
    pub created_at: DateTime<Utc>,
}

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub category_id: CategoryId,
    pub name_en: String,
    pub name_km: String,
    /// Authoritative unit price in USD.
    pub price: Decimal,
    pub image_url: Option<String>,
    pub available: bool,
    /// Remaining stock. `None` means unlimited.
    pub stock_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// An item can be ordered when it is switched on and not sold out.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        if !self.available {
            return false;
        }
        match self.stock_count {
            Some(count) => count > 0,
            None => true,
        }
    }

    /// Whether the current stock covers `quantity` units.
    ///
    /// Unlimited stock always covers the request.
    #[must_use]
    pub const fn has_stock_for(&self, quantity: i32) -> bool {
        match self.stock_count {
            Some(count) => count >= quantity,
            None => true,
        }
    }
}

/// A menu item together with its category's English name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub item: MenuItem,
    pub category: String,
}

/// How an availability update treats the stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockChange {
    /// Leave the current stock count as it is.
    #[default]
    Keep,
    /// Clear the stock count; the item becomes unlimited.
    Unlimited,
    /// Set a finite stock count.
    Set(i32),
}

impl StockChange {
    /// Stock count after applying this change to `current`.
    #[must_use]
    pub const fn apply(self, current: Option<i32>) -> Option<i32> {
        match self {
            Self::Keep => current,
            Self::Unlimited => None,
            Self::Set(count) => Some(count),
        }
    }
}

/// Input for creating a menu item.
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub restaurant_id: RestaurantId,
    pub category_id: CategoryId,
    pub name_en: String,
    pub name_km: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub available: bool,
    pub stock_count: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(available: bool, stock_count: Option<i32>) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: MenuItemId::generate(),
            restaurant_id: RestaurantId::generate(),
            category_id: CategoryId::generate(),
            name_en: "Fish Amok".to_string(),
            name_km: "អាម៉ុកត្រី".to_string(),
            price: Decimal::new(850, 2),
            image_url: None,
            available,
            stock_count,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_purchasable_requires_available_flag() {
        assert!(item(true, None).is_purchasable());
        assert!(!item(false, None).is_purchasable());
        assert!(!item(false, Some(10)).is_purchasable());
    }

    #[test]
    fn test_purchasable_requires_positive_stock() {
        assert!(item(true, Some(1)).is_purchasable());
        assert!(!item(true, Some(0)).is_purchasable());
    }

    #[test]
    fn test_unlimited_stock_covers_any_quantity() {
        assert!(item(true, None).has_stock_for(i32::MAX));
    }

    #[test]
    fn test_stock_change_apply() {
        assert_eq!(StockChange::Keep.apply(Some(3)), Some(3));
        assert_eq!(StockChange::Keep.apply(None), None);
        assert_eq!(StockChange::Unlimited.apply(Some(3)), None);
        assert_eq!(StockChange::Set(0).apply(None), Some(0));
    }

    #[test]
    fn test_finite_stock_bounds_quantity() {
        let fish = item(true, Some(5));
        assert!(fish.has_stock_for(5));
        assert!(!fish.has_stock_for(6));
    }
}
