//! Kitchen dashboard read model.
//!
//! Groups orders into lanes the way the staff board shows them. The board is
//! polled; there is no push channel.

use rust_decimal::Decimal;
use serde::Serialize;

use roomservice_core::{BoardLane, Order, OrderId, OrderStatus, PaymentMethod};

/// How often the dashboard refreshes, in seconds.
pub const POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenBoard {
    pub columns: Vec<BoardColumn>,
    /// Orders in the new-orders lane.
    pub new_count: usize,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub lane: BoardLane,
    pub title: &'static str,
    pub orders: Vec<BoardCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCard {
    pub id: OrderId,
    pub order_number: String,
    pub room_id: String,
    pub guest_name: Option<String>,
    pub total_usd: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// KHQR order still waiting on the gateway.
    pub awaiting_payment: bool,
    pub is_posted_to_folio: bool,
    /// `"<quantity> x <name>"` per line.
    pub lines: Vec<String>,
    pub special_requests: Option<String>,
    /// Status the dashboard's action button moves the order to.
    pub next_status: Option<OrderStatus>,
    /// Whether the order can be posted to the guest folio.
    pub can_post_to_folio: bool,
}

impl From<&Order> for BoardCard {
    fn from(order: &Order) -> Self {
        let lines = order
            .items
            .iter()
            .map(|item| {
                let name = item
                    .menu_item
                    .as_ref()
                    .map_or_else(|| item.menu_item_id.to_string(), |m| m.name_en.clone());
                format!("{} x {name}", item.quantity)
            })
            .collect();

        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            room_id: order.room_id.clone(),
            guest_name: order.guest_name.clone(),
            total_usd: order.total_usd,
            payment_method: order.payment_method,
            status: order.status,
            awaiting_payment: order.status.is_awaiting_payment(),
            is_posted_to_folio: order.is_posted_to_folio,
            lines,
            special_requests: order.special_requests.clone(),
            next_status: order.status.next_step(),
            can_post_to_folio: order.status.allows_folio_posting() && !order.is_posted_to_folio,
        }
    }
}

/// Build the board from orders listed newest first.
///
/// Cancelled orders are left off. Cards keep the input order within a lane.
#[must_use]
pub fn build_board(orders: &[Order]) -> KitchenBoard {
    let columns: Vec<BoardColumn> = BoardLane::ALL
        .iter()
        .map(|&lane| BoardColumn {
            lane,
            title: lane.title(),
            orders: orders
                .iter()
                .filter(|order| order.status.board_lane() == Some(lane))
                .map(BoardCard::from)
                .collect(),
        })
        .collect();

    let new_count = columns
        .iter()
        .find(|column| column.lane == BoardLane::PendingKitchen)
        .map_or(0, |column| column.orders.len());

    KitchenBoard {
        columns,
        new_count,
        poll_interval_secs: POLL_INTERVAL_SECS,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use roomservice_core::{MenuItemId, OrderItem, OrderItemId, RestaurantId};

    use super::*;

    fn order(status: OrderStatus, number: &str) -> Order {
        let now = Utc::now();
        let id = OrderId::generate();
        Order {
            id,
            order_number: number.to_string(),
            room_id: "101".to_string(),
            total_usd: Decimal::new(900, 2),
            payment_method: PaymentMethod::Cash,
            status,
            is_posted_to_folio: false,
            guest_name: None,
            special_requests: None,
            restaurant_id: RestaurantId::generate(),
            created_at: now,
            updated_at: now,
            items: vec![OrderItem {
                id: OrderItemId::generate(),
                order_id: id,
                menu_item_id: MenuItemId::generate(),
                quantity: 2,
                price_at_time: Decimal::new(450, 2),
                menu_item: None,
            }],
        }
    }

    #[test]
    fn test_lanes_in_display_order() {
        let board = build_board(&[]);
        let titles: Vec<&str> = board.columns.iter().map(|c| c.title).collect();
        assert_eq!(
            titles,
            vec!["PENDING KITCHEN", "PREPARING", "READY", "DELIVERED"]
        );
        assert_eq!(board.poll_interval_secs, 10);
    }

    #[test]
    fn test_pending_payment_shares_new_lane() {
        let board = build_board(&[
            order(OrderStatus::PendingPayment, "ORD-000001"),
            order(OrderStatus::PendingKitchen, "ORD-000002"),
            order(OrderStatus::Ready, "ORD-000003"),
            order(OrderStatus::Cancelled, "ORD-000004"),
        ]);

        assert_eq!(board.new_count, 2);
        let new_lane = &board.columns[0];
        assert!(new_lane.orders[0].awaiting_payment);
        assert!(!new_lane.orders[1].awaiting_payment);
        assert_eq!(board.columns[2].orders.len(), 1);

        let shown: usize = board.columns.iter().map(|c| c.orders.len()).sum();
        assert_eq!(shown, 3);
    }

    #[test]
    fn test_card_actions() {
        let board = build_board(&[
            order(OrderStatus::PendingKitchen, "ORD-000001"),
            order(OrderStatus::Delivered, "ORD-000002"),
        ]);

        let new_card = &board.columns[0].orders[0];
        assert_eq!(new_card.next_status, Some(OrderStatus::Preparing));
        assert!(!new_card.can_post_to_folio);

        let delivered = &board.columns[3].orders[0];
        assert_eq!(delivered.next_status, None);
        assert!(delivered.can_post_to_folio);
    }

    #[test]
    fn test_card_line_summary_falls_back_to_id() {
        let card = BoardCard::from(&order(OrderStatus::Preparing, "ORD-000001"));
        assert_eq!(card.lines.len(), 1);
        assert!(card.lines[0].starts_with("2 x "));
    }
}
