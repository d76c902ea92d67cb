//! Request bodies.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use roomservice_core::{
    MenuItemId, OrderId, OrderStatus, PaymentMethod, RequestedLine, StockChange,
};

use crate::services::PlaceOrder;

/// `POST /api/orders`
///
/// Lines carry only ids and quantities. Unknown fields such as a
/// client-side `price` are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(max = 50))]
    pub room_id: Option<String>,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 100))]
    pub guest_name: Option<String>,
    #[validate(length(max = 500))]
    pub special_requests: Option<String>,
    #[validate(
        length(min = 1, max = 100, message = "an order needs between 1 and 100 items"),
        nested
    )]
    pub items: Vec<OrderLineRequest>,
}

/// Bounds mirror `MAX_LINE_QUANTITY`, checked again when pricing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub menu_item_id: MenuItemId,
    #[validate(range(min = 1, max = 999, message = "quantity must be between 1 and 999"))]
    pub quantity: i32,
}

impl From<CreateOrderRequest> for PlaceOrder {
    fn from(request: CreateOrderRequest) -> Self {
        Self {
            room_id: request.room_id,
            payment_method: request.payment_method,
            guest_name: request.guest_name,
            special_requests: request.special_requests,
            lines: request
                .items
                .iter()
                .map(|line| RequestedLine {
                    menu_item_id: line.menu_item_id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

/// `PUT /api/menu/{id}/toggle`
///
/// `stockCount` is three-way: absent keeps the current count, `null` makes
/// the item unlimited, a number sets it.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAvailabilityRequest {
    pub available: bool,
    #[serde(default, deserialize_with = "present")]
    pub stock_count: Option<Option<i32>>,
}

impl ToggleAvailabilityRequest {
    #[must_use]
    pub const fn stock_change(&self) -> StockChange {
        match self.stock_count {
            None => StockChange::Keep,
            Some(None) => StockChange::Unlimited,
            Some(Some(count)) => StockChange::Set(count),
        }
    }
}

impl Validate for ToggleAvailabilityRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(Some(count)) = self.stock_count
            && count < 0
        {
            let mut error = ValidationError::new("range");
            error.message = Some("stock count cannot be negative".into());
            errors.add("stock_count", error);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

/// `PUT /api/menu/{id}/price`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct UpdatePriceRequest {
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
}

fn non_negative(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut error = ValidationError::new("range");
        error.message = Some("price cannot be negative".into());
        return Err(error);
    }
    Ok(())
}

/// `PUT /api/orders/{id}/status`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub is_posted_to_folio: Option<bool>,
}

/// `POST /api/pms/folio`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FolioRequest {
    pub order_id: OrderId,
}

/// Payment gateway callback body. Parsed leniently; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCallback {
    #[serde(alias = "tran_id")]
    pub transaction_id: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roomservice_core::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

    use super::*;

    #[test]
    fn test_create_order_requires_items() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"paymentMethod":"CASH","items":[]}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn test_create_order_rejects_zero_quantity() {
        let request: CreateOrderRequest = serde_json::from_str(
            r#"{"paymentMethod":"KHQR","items":[{"menuItemId":"3f1c5e8a-2b4d-4c6e-9f0a-1b2c3d4e5f60","quantity":0}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    fn order_with_quantity(quantity: i64) -> CreateOrderRequest {
        serde_json::from_value(serde_json::json!({
            "paymentMethod": "CASH",
            "items": [{
                "menuItemId": "3f1c5e8a-2b4d-4c6e-9f0a-1b2c3d4e5f60",
                "quantity": quantity,
            }],
        }))
        .unwrap()
    }

    #[test]
    fn test_create_order_quantity_bounds() {
        assert!(order_with_quantity(i64::from(MAX_LINE_QUANTITY)).validate().is_ok());
        assert!(order_with_quantity(i64::from(MAX_LINE_QUANTITY) + 1).validate().is_err());
        assert!(order_with_quantity(i64::from(i32::MAX)).validate().is_err());
    }

    #[test]
    fn test_create_order_line_count_bounds() {
        let line = serde_json::json!({
            "menuItemId": "3f1c5e8a-2b4d-4c6e-9f0a-1b2c3d4e5f60",
            "quantity": 1,
        });
        let at_limit: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "paymentMethod": "CASH",
            "items": vec![line.clone(); MAX_ORDER_LINES],
        }))
        .unwrap();
        assert!(at_limit.validate().is_ok());

        let over: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "paymentMethod": "CASH",
            "items": vec![line; MAX_ORDER_LINES + 1],
        }))
        .unwrap();
        let errors = over.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn test_create_order_ignores_client_price() {
        let request: CreateOrderRequest = serde_json::from_str(
            r#"{"paymentMethod":"CASH","items":[{"menuItemId":"3f1c5e8a-2b4d-4c6e-9f0a-1b2c3d4e5f60","quantity":2,"price":0.01}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        let order = PlaceOrder::from(request);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_unknown_payment_method_fails_to_parse() {
        let result: Result<CreateOrderRequest, _> =
            serde_json::from_str(r#"{"paymentMethod":"CARD","items":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_toggle_stock_three_way() {
        let keep: ToggleAvailabilityRequest =
            serde_json::from_str(r#"{"available":true}"#).unwrap();
        assert_eq!(keep.stock_change(), StockChange::Keep);

        let unlimited: ToggleAvailabilityRequest =
            serde_json::from_str(r#"{"available":true,"stockCount":null}"#).unwrap();
        assert_eq!(unlimited.stock_change(), StockChange::Unlimited);

        let set: ToggleAvailabilityRequest =
            serde_json::from_str(r#"{"available":false,"stockCount":5}"#).unwrap();
        assert_eq!(set.stock_change(), StockChange::Set(5));
    }

    #[test]
    fn test_toggle_rejects_negative_stock() {
        let request: ToggleAvailabilityRequest =
            serde_json::from_str(r#"{"available":true,"stockCount":-1}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock_count"));
    }

    #[test]
    fn test_price_must_not_be_negative() {
        let ok: UpdatePriceRequest = serde_json::from_str(r#"{"price":"4.00"}"#).unwrap();
        assert!(ok.validate().is_ok());
        let bad: UpdatePriceRequest = serde_json::from_str(r#"{"price":"-1.00"}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_gateway_callback_accepts_tran_id() {
        let callback: GatewayCallback =
            serde_json::from_str(r#"{"tran_id":"abc","status":"SUCCESS"}"#).unwrap();
        assert_eq!(callback.transaction_id.as_deref(), Some("abc"));

        let callback: GatewayCallback =
            serde_json::from_str(r#"{"transactionId":"abc"}"#).unwrap();
        assert_eq!(callback.transaction_id.as_deref(), Some("abc"));
        assert!(callback.status.is_none());
    }
}
