//! Core types for room service.
//!
//! This module provides type-safe wrappers for the ordering domain.

pub mod cart;
pub mod id;
pub mod menu;
pub mod money;
pub mod order;
pub mod status;

pub use cart::{CART_STORAGE_KEY, Cart, CartEntry};
pub use id::*;
pub use menu::{Category, MenuEntry, MenuItem, NewMenuItem, Restaurant, StockChange};
pub use money::{format_amount, line_total, round_currency};
pub use order::{
    MAX_LINE_QUANTITY, MAX_ORDER_LINES, MAX_ORDER_TOTAL, NewOrder, NewOrderLine, Order,
    OrderItem, RequestedLine, WALK_IN_ROOM, order_number_at,
};
pub use status::*;
