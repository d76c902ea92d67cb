//! Order placement and the status workflow.
//!
//! Placing an order runs validate, price, persist, then (for KHQR) sign. Staff
//! status changes and gateway confirmations go straight to the ledger; no
//! transition is refused because of the status it comes from.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use roomservice_core::{
    MAX_LINE_QUANTITY, MAX_ORDER_LINES, MAX_ORDER_TOTAL, MenuItemId, NewOrder, NewOrderLine,
    Order, OrderId, OrderStatus, PaymentMethod, RequestedLine, WALK_IN_ROOM, order_number_at,
};

use super::notifications::Notifier;
use super::payway::{PaymentRequest, PaywaySigner, SigningError};
use super::pricing::price_order;
use crate::db::{CatalogStore, OrderLedger, RepositoryError};
use crate::error::add_breadcrumb;

/// Gateway status that confirms a payment.
pub const GATEWAY_SUCCESS: &str = "SUCCESS";

/// Errors from the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Item {0} is not available.")]
    ItemUnavailable(MenuItemId),

    #[error("Not enough stock for {0}.")]
    InsufficientStock(String),

    #[error("An order needs at least one item.")]
    EmptyOrder,

    #[error("An order can have at most {} items.", MAX_ORDER_LINES)]
    TooManyLines,

    #[error("Quantity must be between 1 and {}.", MAX_LINE_QUANTITY)]
    QuantityOutOfRange(i32),

    #[error("Order total exceeds {} USD.", MAX_ORDER_TOTAL)]
    TotalTooLarge,

    /// No restaurant exists; the catalog has not been seeded.
    #[error("restaurant not initialized")]
    Uninitialized,

    #[error("Order not found")]
    NotFound,

    #[error("{0}")]
    InvalidState(String),

    #[error("persistence failure: {0}")]
    Persistence(RepositoryError),

    #[error("payment signing failed: {0}")]
    Signing(#[from] SigningError),
}

impl From<RepositoryError> for OrderError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Persistence(other),
        }
    }
}

/// A guest's checkout request after edge validation.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub room_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub guest_name: Option<String>,
    pub special_requests: Option<String>,
    pub lines: Vec<RequestedLine>,
}

/// The created order and, for KHQR, what the client needs for payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    /// `null` for cash orders.
    pub aba_data: Option<PaymentRequest>,
}

/// Outcome of a gateway callback.
#[derive(Debug, Clone)]
pub enum PaymentConfirmation {
    /// The callback did not report success; nothing changed.
    Ignored { status: String },
    /// The order moved to the kitchen.
    Confirmed { order: Order, previous: OrderStatus },
}

/// Coordinates the catalog, the ledger, payment signing and notifications.
#[derive(Clone)]
pub struct OrderService {
    pub(super) catalog: Arc<dyn CatalogStore>,
    pub(super) ledger: Arc<dyn OrderLedger>,
    signer: PaywaySigner,
    notifier: Notifier,
}

impl OrderService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn OrderLedger>,
        signer: PaywaySigner,
        notifier: Notifier,
    ) -> Self {
        Self {
            catalog,
            ledger,
            signer,
            notifier,
        }
    }

    /// Price, persist and (for KHQR) sign a new order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` for empty orders, unavailable or short items, a
    /// missing restaurant, or storage failures. Nothing is written when
    /// pricing fails.
    #[instrument(skip(self, request), fields(method = %request.payment_method, lines = request.lines.len()))]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<PlacedOrder, OrderError> {
        if request.lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if request.lines.len() > MAX_ORDER_LINES {
            return Err(OrderError::TooManyLines);
        }

        let priced = price_order(self.catalog.as_ref(), &request.lines).await?;
        let restaurant = self
            .catalog
            .first_restaurant()
            .await?
            .ok_or(OrderError::Uninitialized)?;

        let created_at = Utc::now();
        let draft = NewOrder {
            order_number: order_number_at(created_at),
            room_id: request
                .room_id
                .filter(|room| !room.trim().is_empty())
                .unwrap_or_else(|| WALK_IN_ROOM.to_string()),
            total_usd: priced.total,
            payment_method: request.payment_method,
            status: OrderStatus::initial_for(request.payment_method),
            guest_name: request.guest_name,
            special_requests: request.special_requests,
            restaurant_id: restaurant.id,
            created_at,
            lines: priced.lines.iter().map(NewOrderLine::from).collect(),
        };

        let order = self.ledger.create_order(draft).await?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_usd,
            "Order placed"
        );
        add_breadcrumb(
            "order",
            "Order placed",
            Some(&[
                ("order_number", order.order_number.as_str()),
                ("payment_method", order.payment_method.relay_tag()),
            ]),
        );

        let aba_data = match order.payment_method {
            PaymentMethod::Khqr => Some(self.signer.payment_request(
                order.id,
                order.total_usd,
                created_at,
            )?),
            PaymentMethod::Cash => None,
        };

        self.notifier.order_placed(&order, &priced.lines);

        Ok(PlacedOrder { order, aba_data })
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Persistence` if the ledger cannot be read.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.ledger.list_orders().await?)
    }

    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown ids.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.ledger.get_order(id).await?.ok_or(OrderError::NotFound)
    }

    /// Set an order's status, optionally together with the folio flag.
    ///
    /// The folio flag is only accepted while the stored status is
    /// `DELIVERED`; otherwise nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown ids and
    /// `OrderError::InvalidState` when the folio flag is refused.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        posted_to_folio: Option<bool>,
    ) -> Result<Order, OrderError> {
        let order = match posted_to_folio {
            Some(posted) => self
                .ledger
                .update_status_and_folio(id, status, posted)
                .await
                .map_err(folio_conflict)?,
            None => self.ledger.update_status(id, status).await?,
        };
        info!(order_number = %order.order_number, %status, "Order status updated");
        Ok(order)
    }

    /// Apply a payment gateway callback.
    ///
    /// A `SUCCESS` status moves the order to `PENDING_KITCHEN` whatever its
    /// current status. The callback is not authenticated.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` when the transaction id does not name an
    /// order, or `OrderError::Persistence` on storage failure.
    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        gateway: &str,
        transaction_id: &str,
        status: &str,
    ) -> Result<PaymentConfirmation, OrderError> {
        if status != GATEWAY_SUCCESS {
            return Ok(PaymentConfirmation::Ignored {
                status: status.to_string(),
            });
        }

        let id: OrderId = transaction_id.parse().map_err(|_| OrderError::NotFound)?;
        let previous = self.get_order(id).await?.status;
        if previous != OrderStatus::PendingPayment {
            warn!(
                %id,
                %previous,
                "Payment confirmation for an order that was not awaiting payment"
            );
        }

        let order = self
            .ledger
            .update_status(id, OrderStatus::PendingKitchen)
            .await?;
        info!(order_number = %order.order_number, gateway, "Order paid via webhook, moving to kitchen");

        Ok(PaymentConfirmation::Confirmed { order, previous })
    }
}

/// Map a refused folio update to `InvalidState`.
pub(super) fn folio_conflict(err: RepositoryError) -> OrderError {
    match err {
        RepositoryError::Conflict(_) => {
            OrderError::InvalidState(super::folio::NOT_DELIVERED_MESSAGE.to_string())
        }
        other => other.into(),
    }
}
