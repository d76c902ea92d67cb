//! Status enums for orders and payments.
//!
//! The order status workflow is deliberately permissive: any status may be
//! written from any prior status. The helpers here describe how the kitchen
//! dashboard presents and advances orders, they do not enforce transitions.

use serde::{Deserialize, Serialize};

/// How the guest pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(
        type_name = "roomservice.payment_method",
        rename_all = "SCREAMING_SNAKE_CASE"
    )
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Paid to staff on delivery.
    Cash,
    /// Mobile QR payment routed through the payment gateway.
    Khqr,
}

impl PaymentMethod {
    /// Lowercase tag used by chat relay payloads.
    #[must_use]
    pub const fn relay_tag(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Khqr => "khqr",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "CASH"),
            Self::Khqr => write!(f, "KHQR"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(Self::Cash),
            "KHQR" => Ok(Self::Khqr),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Order fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(
        type_name = "roomservice.order_status",
        rename_all = "SCREAMING_SNAKE_CASE"
    )
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// KHQR order waiting for the gateway to confirm payment.
    PendingPayment,
    /// Paid (or cash) order waiting for the kitchen to accept it.
    PendingKitchen,
    /// Kitchen is preparing the order.
    Preparing,
    /// Ready for delivery to the room.
    Ready,
    /// Delivered to the guest.
    Delivered,
    /// Cancelled. Terminal.
    Cancelled,
}

/// Column of the kitchen dashboard an order is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardLane {
    /// New orders, paid or awaiting payment.
    PendingKitchen,
    Preparing,
    Ready,
    Delivered,
}

impl BoardLane {
    /// Lanes in display order.
    pub const ALL: [Self; 4] = [
        Self::PendingKitchen,
        Self::Preparing,
        Self::Ready,
        Self::Delivered,
    ];

    /// Column heading shown on the dashboard.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::PendingKitchen => "PENDING KITCHEN",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
        }
    }
}

impl OrderStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 6] = [
        Self::PendingPayment,
        Self::PendingKitchen,
        Self::Preparing,
        Self::Ready,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Status a freshly created order starts in.
    #[must_use]
    pub const fn initial_for(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Khqr => Self::PendingPayment,
            PaymentMethod::Cash => Self::PendingKitchen,
        }
    }

    /// Dashboard lane for this status. Cancelled orders are not shown.
    #[must_use]
    pub const fn board_lane(self) -> Option<BoardLane> {
        match self {
            Self::PendingPayment | Self::PendingKitchen => Some(BoardLane::PendingKitchen),
            Self::Preparing => Some(BoardLane::Preparing),
            Self::Ready => Some(BoardLane::Ready),
            Self::Delivered => Some(BoardLane::Delivered),
            Self::Cancelled => None,
        }
    }

    /// The status the dashboard offers as the next step, if any.
    ///
    /// Advisory only: the API accepts any status from any status.
    #[must_use]
    pub const fn next_step(self) -> Option<Self> {
        match self {
            Self::PendingPayment | Self::PendingKitchen => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether the order may be charged to the guest's folio.
    #[must_use]
    pub const fn allows_folio_posting(self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Whether the order is still waiting for gateway confirmation.
    #[must_use]
    pub const fn is_awaiting_payment(self) -> bool {
        matches!(self, Self::PendingPayment)
    }

    /// Whether the order has reached the end of the workflow.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Status name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::PendingKitchen => "PENDING_KITCHEN",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}
