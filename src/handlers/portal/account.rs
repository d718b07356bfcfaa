use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::id;
use crate::models::Account;

use super::require_portal_key;

pub(super) fn load_account(state: &AppState, id: &str) -> Result<Account> {
    if !id::is_valid_prefixed_id(id) {
        return Err(AppError::BadRequest("Invalid account id".into()));
    }
    let conn = state.db.get()?;
    queries::get_account_by_id(&conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("Account {} not found", id)))
}

/// Dashboard snapshot: profile flags, credit usage, and subscription state.
pub async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Account>> {
    require_portal_key(&headers, &state)?;
    Ok(Json(load_account(&state, &id)?))
}

#[derive(Debug, Serialize)]
pub struct LicenseInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    /// Whether the key is backed by an active subscription
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
}

/// Entitlement summary for the desktop client download page.
pub async fn get_account_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<LicenseInfo>> {
    require_portal_key(&headers, &state)?;
    let account = load_account(&state, &id)?;

    let (active, plan_name) = account
        .subscription
        .as_ref()
        .map(|s| (s.active, Some(s.plan.name.clone())))
        .unwrap_or((false, None));

    Ok(Json(LicenseInfo {
        license_key: account.license_key,
        active,
        plan_name,
    }))
}
