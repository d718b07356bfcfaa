//! Provider-agnostic webhook processing: event model, account resolution,
//! and the state reconciler.
//!
//! Payload parsing and signature mechanics are provider-specific and live
//! next to each provider's handler; everything here operates on
//! already-validated, strongly-typed event data.

use rusqlite::Connection;
use serde::Serialize;

use crate::credits;
use crate::db::queries::{self, NewSubscription};
use crate::error::{AppError, Result};
use crate::license;
use crate::models::{Account, SubscriptionStatus};

/// Acknowledgment body returned for every webhook:
/// `{success, event_processed?, error?}`.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_processed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    pub fn processed(event_type: &str) -> Self {
        Self {
            success: true,
            event_processed: Some(event_type.to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            event_processed: None,
            error: Some(error.into()),
        }
    }
}

/// Data extracted from a `subscription.created` event.
#[derive(Debug)]
pub struct CreatedData {
    pub subscription_id: String,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    /// Plan price id, consulted for the credit grant
    pub price_id: Option<String>,
    pub plan_name: Option<String>,
    pub next_billed_at: Option<String>,
    /// Correlation account id from checkout custom data
    pub user_id: Option<String>,
}

/// Data extracted from a `subscription.updated` event.
#[derive(Debug)]
pub struct StatusData {
    pub subscription_id: String,
    pub status: String,
    pub customer_email: Option<String>,
    pub user_id: Option<String>,
}

/// Data extracted from a `subscription.cancelled` event.
#[derive(Debug)]
pub struct CancellationData {
    pub subscription_id: String,
    pub customer_email: Option<String>,
    pub user_id: Option<String>,
}

/// Parsed webhook event, tagged by kind. Parsed once at the dispatcher
/// boundary; downstream code never touches raw JSON.
#[derive(Debug)]
pub enum WebhookEvent {
    SubscriptionCreated(CreatedData),
    SubscriptionUpdated(StatusData),
    SubscriptionCancelled(CancellationData),
    /// Event kind not relevant to account state - acknowledged as a no-op
    Unknown(String),
}

/// Outcome of mapping an event to an account.
///
/// Resolution failure is explicit so the dispatcher (and tests) can tell
/// "processed" apart from "matched nothing" instead of collapsing both
/// into a success acknowledgment.
#[derive(Debug)]
pub enum Resolution {
    Resolved(Account),
    NotFound,
    /// Multiple accounts share the email; refusing to guess which one
    Ambiguous,
}

/// Resolve an event to exactly one account.
///
/// Primary path: explicit account id from checkout correlation data, a
/// point lookup. Fallback path (only when no id was attached): equality
/// query on email. The two paths do not chain - an id that matches nothing
/// is NotFound even if the email would have matched.
pub fn resolve_account(
    conn: &Connection,
    user_id: Option<&str>,
    email: Option<&str>,
) -> Result<Resolution> {
    if let Some(id) = user_id {
        return Ok(match queries::get_account_by_id(conn, id)? {
            Some(account) => Resolution::Resolved(account),
            None => Resolution::NotFound,
        });
    }

    let Some(email) = email else {
        return Ok(Resolution::NotFound);
    };

    let mut matches = queries::find_accounts_by_email(conn, email)?;
    Ok(match matches.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Resolved(matches.remove(0)),
        _ => Resolution::Ambiguous,
    })
}

/// Result of applying an event to an account.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The event id was seen before; nothing was written (idempotent)
    AlreadyProcessed,
}

/// Apply a `subscription.created` event: allocate credits from the plan,
/// mint a license key, and write the subscription sub-record plus reset
/// credit usage as one statement.
///
/// Replay prevention and the account write happen in a single database
/// transaction, keyed by the provider event id - or, when the provider
/// omits one, by a synthetic `created:{subscription_id}` key so a redelivered
/// creation never regenerates the license key or re-grants credits.
pub fn process_created(
    conn: &mut Connection,
    provider: &str,
    account: &Account,
    event_id: Option<&str>,
    data: &CreatedData,
) -> Result<Outcome> {
    let replay_key = match event_id {
        Some(id) => id.to_string(),
        None => format!("created:{}", data.subscription_id),
    };

    let allocation = data
        .price_id
        .as_deref()
        .map(credits::allocation_for)
        .unwrap_or(0);
    let license_key = license::generate_key();

    let tx = conn.transaction()?;

    if !queries::try_record_webhook_event(&tx, provider, &replay_key)? {
        // Rolled back on drop; the first delivery already did the work.
        return Ok(Outcome::AlreadyProcessed);
    }

    let sub = NewSubscription {
        subscription_id: data.subscription_id.clone(),
        status: "active".to_string(),
        active: true,
        plan_id: data.price_id.clone(),
        plan_name: data
            .plan_name
            .clone()
            .unwrap_or_else(|| "Unknown Plan".to_string()),
        next_billed_at: data.next_billed_at.clone(),
        license_key: license_key.clone(),
        credit_total: allocation,
    };

    if !queries::apply_subscription_created(&tx, &account.id, &sub)? {
        return Err(AppError::NotFound(format!(
            "account {} disappeared during reconciliation",
            account.id
        )));
    }

    tx.commit()?;

    tracing::info!(
        "{} subscription created: subscription={}, account={}, plan={:?}, credits={}",
        provider,
        data.subscription_id,
        account.id,
        data.price_id,
        allocation
    );

    Ok(Outcome::Applied)
}

/// Apply a `subscription.updated` event: recompute the derived `active`
/// flag from the status allow-list and write only the status fields.
/// Credits and license key are left alone.
pub fn process_status_update(
    conn: &mut Connection,
    provider: &str,
    account: &Account,
    event_id: Option<&str>,
    data: &StatusData,
) -> Result<Outcome> {
    let active = SubscriptionStatus::from_provider(&data.status).is_active();

    let tx = conn.transaction()?;

    if let Some(id) = event_id {
        if !queries::try_record_webhook_event(&tx, provider, id)? {
            return Ok(Outcome::AlreadyProcessed);
        }
    }

    if !queries::update_subscription_status(&tx, &account.id, &data.status, active)? {
        return Err(AppError::NotFound(format!(
            "account {} disappeared during reconciliation",
            account.id
        )));
    }
    tx.commit()?;

    tracing::info!(
        "{} subscription updated: subscription={}, account={}, status={}, active={}",
        provider,
        data.subscription_id,
        account.id,
        data.status,
        active
    );

    Ok(Outcome::Applied)
}

/// Apply a `subscription.cancelled` event: force status to cancelled and
/// active to false. The subscription sub-record is retained for history.
pub fn process_cancellation(
    conn: &mut Connection,
    provider: &str,
    account: &Account,
    event_id: Option<&str>,
    data: &CancellationData,
) -> Result<Outcome> {
    let tx = conn.transaction()?;

    if let Some(id) = event_id {
        if !queries::try_record_webhook_event(&tx, provider, id)? {
            return Ok(Outcome::AlreadyProcessed);
        }
    }

    if !queries::update_subscription_status(&tx, &account.id, "cancelled", false)? {
        return Err(AppError::NotFound(format!(
            "account {} disappeared during reconciliation",
            account.id
        )));
    }
    tx.commit()?;

    tracing::info!(
        "{} subscription cancelled: subscription={}, account={}",
        provider,
        data.subscription_id,
        account.id
    );

    Ok(Outcome::Applied)
}
