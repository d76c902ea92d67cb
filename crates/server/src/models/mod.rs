//! Request and response shapes for the HTTP API.
//!
//! Request bodies are deserialized with serde and checked with `validator`
//! before any service sees them.

pub mod requests;
pub mod views;

pub use requests::{
    CreateOrderRequest, FolioRequest, GatewayCallback, OrderLineRequest, ToggleAvailabilityRequest,
    UpdatePriceRequest, UpdateStatusRequest,
};
pub use views::{MenuItemView, WebhookAck};
