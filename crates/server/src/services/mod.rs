//! Business logic for the ordering workflow.
//!
//! # Services
//!
//! - `pricing` - Authoritative order pricing against the catalog
//! - `payway` - KHQR payment request signing
//! - `ordering` - Order placement, status updates, gateway confirmation
//! - `folio` - Posting delivered orders to the guest folio
//! - `board` - Kitchen dashboard read model
//! - `notifications` - Best-effort staff alerts

pub mod board;
pub mod folio;
pub mod notifications;
pub mod ordering;
pub mod payway;
pub mod pricing;

pub use board::{KitchenBoard, build_board};
pub use folio::FolioPosting;
pub use notifications::Notifier;
pub use ordering::{OrderError, OrderService, PaymentConfirmation, PlaceOrder, PlacedOrder};
pub use payway::{PaymentRequest, PaywaySigner, SigningError};
pub use pricing::{PricedLine, PricedOrder, price_order};
