//! Payment gateway callbacks.
//!
//! The gateway is always answered `200 {"status":"OK"}` so it does not retry,
//! whatever happened to the callback. Failures are logged instead.
//!
//! Callbacks are not authenticated: anyone who knows an order id can mark it
//! paid. Startup logs a warning about this.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use tracing::{error, info, instrument, warn};

use crate::models::{GatewayCallback, WebhookAck};
use crate::services::PaymentConfirmation;
use crate::state::AppState;

#[instrument(skip(state, body))]
pub async fn gateway_callback(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    body: Bytes,
) -> Json<WebhookAck> {
    let callback: GatewayCallback = serde_json::from_slice(&body).unwrap_or_else(|e| {
        warn!(error = %e, "Unreadable gateway callback body");
        GatewayCallback::default()
    });

    let (Some(transaction_id), Some(status)) = (callback.transaction_id, callback.status) else {
        warn!("Gateway callback without transaction id or status");
        return Json(WebhookAck::OK);
    };

    match state
        .orders()
        .confirm_payment(&gateway, &transaction_id, &status)
        .await
    {
        Ok(PaymentConfirmation::Confirmed { order, previous }) => {
            info!(
                order_id = %order.id,
                %previous,
                "Payment confirmed, order sent to kitchen"
            );
        }
        Ok(PaymentConfirmation::Ignored { status }) => {
            info!(%transaction_id, %status, "Gateway callback ignored");
        }
        Err(e) => {
            error!(%transaction_id, error = %e, "Gateway callback failed");
        }
    }

    Json(WebhookAck::OK)
}
