use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::Result;

use super::require_portal_key;

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub subscription_id: String,
    /// true = cancel immediately, false = at the end of the billing period
    #[serde(default)]
    pub immediate: bool,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
}

/// Proxy a cancellation to the payment provider.
///
/// The account record is NOT touched here - the provider confirms the
/// cancellation through a `subscription.cancelled` webhook, which is the
/// single write path for subscription state.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CancelRequest>,
) -> Result<Json<CancelResponse>> {
    require_portal_key(&headers, &state)?;

    state
        .paddle
        .cancel_subscription(&req.subscription_id, req.immediate)
        .await?;

    tracing::info!(
        "Cancellation requested for subscription {} (immediate={})",
        req.subscription_id,
        req.immediate
    );

    Ok(Json(CancelResponse { success: true }))
}
