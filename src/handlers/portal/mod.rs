//! Portal-facing API: reads of reconciled account state plus a couple of
//! billing operations proxied to the payment provider.
//!
//! Authentication against end users is the hosted identity provider's job;
//! these routes sit behind it and require the portal service key instead.

mod account;
mod subscription;
mod transactions;

pub use account::{get_account, get_account_license};
pub use subscription::cancel_subscription;
pub use transactions::list_account_transactions;

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::util::constant_time_str_eq;

const PORTAL_KEY_HEADER: &str = "x-portal-key";

/// Check the portal service key. An unconfigured key rejects everything
/// rather than failing open.
pub(crate) fn require_portal_key(headers: &HeaderMap, state: &AppState) -> Result<()> {
    let Some(ref expected) = state.portal_api_key else {
        tracing::warn!("Portal request rejected: PORTAL_API_KEY not configured");
        return Err(AppError::Unauthorized);
    };

    let provided = headers
        .get(PORTAL_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if !constant_time_str_eq(provided, expected) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portal/accounts/{id}", get(get_account))
        .route("/portal/accounts/{id}/license", get(get_account_license))
        .route(
            "/portal/accounts/{id}/transactions",
            get(list_account_transactions),
        )
        .route("/portal/subscriptions/cancel", post(cancel_subscription))
}
