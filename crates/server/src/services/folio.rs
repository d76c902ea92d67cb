//! Posting delivered orders to the guest's room folio.
//!
//! The property-management system is mocked: posting records the charge in
//! the log and sets the order's folio flag.

use serde::Serialize;
use tracing::{info, instrument};

use roomservice_core::{Order, OrderId};

use super::ordering::{OrderError, OrderService, folio_conflict};

pub(super) const NOT_DELIVERED_MESSAGE: &str = "Order must be delivered before posting to PMS";
const POSTED_MESSAGE: &str = "Successfully posted to Guest Folio";

/// Response to a folio posting.
#[derive(Debug, Clone, Serialize)]
pub struct FolioPosting {
    pub success: bool,
    pub message: &'static str,
    pub order: Order,
}

impl OrderService {
    /// Charge a delivered order to the room's folio.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown orders and
    /// `OrderError::InvalidState` unless the order is `DELIVERED`.
    #[instrument(skip(self))]
    pub async fn post_to_folio(&self, id: OrderId) -> Result<FolioPosting, OrderError> {
        let order = self
            .ledger
            .get_order(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.status.allows_folio_posting() {
            return Err(OrderError::InvalidState(NOT_DELIVERED_MESSAGE.to_string()));
        }

        info!(
            amount = %order.total_usd,
            room = %order.room_id,
            order_number = %order.order_number,
            "Posting charge to guest folio"
        );

        let order = self
            .ledger
            .set_folio_posted(id, true)
            .await
            .map_err(folio_conflict)?;

        Ok(FolioPosting {
            success: true,
            message: POSTED_MESSAGE,
            order,
        })
    }
}
