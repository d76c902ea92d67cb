//! `PostgreSQL` order ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};
use uuid::Uuid;

use roomservice_core::{
    NewOrder, Order, OrderId, OrderItem, OrderItemId, OrderStatus, PaymentMethod, RestaurantId,
};

use super::catalog::MenuItemRow;
use super::{OrderLedger, PgStore, RepositoryError, map_constraint};

const ORDER_COLUMNS: &str = "id, order_number, room_id, total_usd, payment_method, status, \
     is_posted_to_folio, guest_name, special_requests, restaurant_id, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    room_id: String,
    total_usd: Decimal,
    payment_method: PaymentMethod,
    status: OrderStatus,
    is_posted_to_folio: bool,
    guest_name: Option<String>,
    special_requests: Option<String>,
    restaurant_id: RestaurantId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            room_id: self.room_id,
            total_usd: self.total_usd,
            payment_method: self.payment_method,
            status: self.status,
            is_posted_to_folio: self.is_posted_to_folio,
            guest_name: self.guest_name,
            special_requests: self.special_requests,
            restaurant_id: self.restaurant_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

/// An order line joined with its menu item.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    line_id: OrderItemId,
    order_id: OrderId,
    quantity: i32,
    price_at_time: Decimal,
    #[sqlx(flatten)]
    menu_item: MenuItemRow,
}

impl From<OrderLineRow> for OrderItem {
    fn from(row: OrderLineRow) -> Self {
        let menu_item = roomservice_core::MenuItem::from(row.menu_item);
        Self {
            id: row.line_id,
            order_id: row.order_id,
            menu_item_id: menu_item.id,
            quantity: row.quantity,
            price_at_time: row.price_at_time,
            menu_item: Some(menu_item),
        }
    }
}

impl PgStore {
    /// Load the lines for a set of orders, grouped by order.
    async fn fetch_lines(
        &self,
        order_ids: &[OrderId],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        let ids: Vec<Uuid> = order_ids.iter().map(OrderId::as_uuid).collect();

        let rows: Vec<OrderLineRow> = sqlx::query_as(
            r"
            SELECT oi.id AS line_id, oi.order_id, oi.quantity, oi.price_at_time,
                   m.id, m.restaurant_id, m.category_id, m.name_en, m.name_km,
                   m.price, m.image_url, m.available, m.stock_count,
                   m.created_at, m.updated_at
            FROM roomservice.order_item oi
            JOIN roomservice.menu_item m ON m.id = oi.menu_item_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.line_no
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        let mut lines: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            lines.entry(row.order_id).or_default().push(row.into());
        }
        Ok(lines)
    }

    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<OrderId> = rows.iter().map(|row| row.id).collect();
        let mut lines = self.fetch_lines(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let items = lines.remove(&row.id).unwrap_or_default();
                if items.is_empty() {
                    return Err(RepositoryError::DataCorruption(format!(
                        "order {} has no lines",
                        row.id
                    )));
                }
                Ok(row.into_order(items))
            })
            .collect()
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM roomservice.room_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(self.attach_lines(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Explain why a delivered-only update matched no row.
    async fn folio_refusal(&self, id: OrderId) -> RepositoryError {
        match self.fetch_order(id).await {
            Ok(Some(order)) => {
                RepositoryError::Conflict(format!("order is {}, not DELIVERED", order.status))
            }
            Ok(None) => RepositoryError::NotFound,
            Err(e) => e,
        }
    }
}

#[async_trait]
impl OrderLedger for PgStore {
    #[instrument(skip(self, order), fields(order_number = %order.order_number, lines = order.lines.len()))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::generate();
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r"
            INSERT INTO roomservice.room_order
                (id, order_number, room_id, total_usd, payment_method, status,
                 guest_name, special_requests, restaurant_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            ",
        )
        .bind(id)
        .bind(&order.order_number)
        .bind(&order.room_id)
        .bind(order.total_usd)
        .bind(order.payment_method)
        .bind(order.status)
        .bind(&order.guest_name)
        .bind(&order.special_requests)
        .bind(order.restaurant_id)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "order"))?;

        for (line_no, line) in (1_i32..).zip(&order.lines) {
            sqlx::query(
                r"
                INSERT INTO roomservice.order_item
                    (id, order_id, line_no, menu_item_id, quantity, price_at_time)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(OrderItemId::generate())
            .bind(id)
            .bind(line_no)
            .bind(line.menu_item_id)
            .bind(line.quantity)
            .bind(line.price_at_time)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint(e, "order line"))?;
        }

        tx.commit().await?;
        debug!(order_id = %id, "Created order");

        self.fetch_order(id).await?.ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM roomservice.room_order ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool())
        .await?;

        self.attach_lines(rows).await
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.fetch_order(id).await
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE roomservice.room_order
            SET status = $2, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(status)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.fetch_order(id).await?.ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self))]
    async fn set_folio_posted(
        &self,
        id: OrderId,
        posted: bool,
    ) -> Result<Order, RepositoryError> {
        // Status check and write in one statement.
        let result = sqlx::query(
            r"
            UPDATE roomservice.room_order
            SET is_posted_to_folio = $2, updated_at = now()
            WHERE id = $1 AND status = $3
            ",
        )
        .bind(id)
        .bind(posted)
        .bind(OrderStatus::Delivered)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.folio_refusal(id).await);
        }

        self.fetch_order(id).await?.ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self))]
    async fn update_status_and_folio(
        &self,
        id: OrderId,
        status: OrderStatus,
        posted: bool,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE roomservice.room_order
            SET status = $2, is_posted_to_folio = $3, updated_at = now()
            WHERE id = $1 AND status = $4
            ",
        )
        .bind(id)
        .bind(status)
        .bind(posted)
        .bind(OrderStatus::Delivered)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.folio_refusal(id).await);
        }

        self.fetch_order(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}
