//! Property-management system (folio) route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::models::FolioRequest;
use crate::services::FolioPosting;
use crate::state::AppState;

/// Post a delivered order to the guest folio.
#[instrument(skip(state), fields(order_id = %body.order_id))]
pub async fn post_to_folio(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<FolioRequest>,
) -> Result<Json<FolioPosting>> {
    Ok(Json(state.orders().post_to_folio(body.order_id).await?))
}
