//! The guest's cart, held by the client until checkout.
//!
//! One [`CartEntry`] per unit: ordering two lattes means two entries. The cart
//! is a plain serializable value the client stores under [`CART_STORAGE_KEY`];
//! the server never holds carts. Prices in the cart are for display only, the
//! server re-prices every line at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::MenuItemId;
use super::menu::MenuItem;
use super::order::{RequestedLine, WALK_IN_ROOM};

/// Local storage key the client persists the cart under.
pub const CART_STORAGE_KEY: &str = "hotel-cart-storage";

/// A snapshot of a menu item the guest intends to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub menu_item_id: MenuItemId,
    pub name_en: String,
    /// Display price, never sent to the server.
    pub price: Decimal,
}

impl From<&MenuItem> for CartEntry {
    fn from(item: &MenuItem) -> Self {
        Self {
            menu_item_id: item.id,
            name_en: item.name_en.clone(),
            price: item.price,
        }
    }
}

/// Client-side cart state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub room_id: String,
    pub entries: Vec<CartEntry>,
}

impl Default for Cart {
    fn default() -> Self {
        Self {
            room_id: WALK_IN_ROOM.to_string(),
            entries: Vec::new(),
        }
    }
}

impl Cart {
    /// Create an empty cart for a walk-in guest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the room the order will be delivered to.
    pub fn set_room(&mut self, room_id: impl Into<String>) {
        self.room_id = room_id.into();
    }

    /// Add one unit of an item.
    pub fn add(&mut self, entry: CartEntry) {
        self.entries.push(entry);
    }

    /// Remove one unit of an item. Returns `false` if the item was not in the cart.
    pub fn remove(&mut self, menu_item_id: MenuItemId) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.menu_item_id == menu_item_id)
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of units in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Display total of the cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|entry| entry.price).sum()
    }

    /// Group entries into checkout lines, in the order items were first added.
    #[must_use]
    pub fn lines(&self) -> Vec<RequestedLine> {
        let mut lines: Vec<RequestedLine> = Vec::new();
        for entry in &self.entries {
            if let Some(line) = lines
                .iter_mut()
                .find(|line| line.menu_item_id == entry.menu_item_id)
            {
                line.quantity += 1;
            } else {
                lines.push(RequestedLine {
                    menu_item_id: entry.menu_item_id,
                    quantity: 1,
                });
            }
        }
        lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(id: MenuItemId, name: &str, cents: i64) -> CartEntry {
        CartEntry {
            menu_item_id: id,
            name_en: name.to_string(),
            price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_new_cart_is_walk_in() {
        let cart = Cart::new();
        assert_eq!(cart.room_id, WALK_IN_ROOM);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lines_group_repeated_units() {
        let amok = MenuItemId::generate();
        let latte = MenuItemId::generate();
        let mut cart = Cart::new();
        cart.add(entry(latte, "Iced Latte", 350));
        cart.add(entry(amok, "Fish Amok", 850));
        cart.add(entry(latte, "Iced Latte", 350));

        let lines = cart.lines();
        assert_eq!(
            lines,
            vec![
                RequestedLine {
                    menu_item_id: latte,
                    quantity: 2
                },
                RequestedLine {
                    menu_item_id: amok,
                    quantity: 1
                },
            ]
        );
        assert_eq!(cart.total(), Decimal::new(1550, 2));
        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_remove_takes_one_unit() {
        let latte = MenuItemId::generate();
        let mut cart = Cart::new();
        cart.add(entry(latte, "Iced Latte", 350));
        cart.add(entry(latte, "Iced Latte", 350));

        assert!(cart.remove(latte));
        assert_eq!(cart.len(), 1);
        assert!(cart.remove(latte));
        assert!(!cart.remove(latte));
    }

    #[test]
    fn test_clear_keeps_room() {
        let mut cart = Cart::new();
        cart.set_room("305");
        cart.add(entry(MenuItemId::generate(), "Fresh Coconut", 250));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.room_id, "305");
    }

    #[test]
    fn test_cart_survives_storage_round_trip() {
        let mut cart = Cart::new();
        cart.set_room("112");
        cart.add(entry(MenuItemId::generate(), "Kuy Teav", 450));
        let stored = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, cart);
    }
}
