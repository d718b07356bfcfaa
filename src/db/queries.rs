use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::{Account, CreateAccount, CreditUsage, Plan, Subscription};

fn now() -> i64 {
    Utc::now().timestamp()
}

const ACCOUNT_COLS: &str = "id, email, name, company, role, email_verified, \
     subscription_id, subscription_status, subscription_active, plan_id, plan_name, \
     next_billed_at, subscription_license_key, credit_used, credit_total, license_key, \
     created_at, updated_at, last_login_at";

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    let subscription_id: Option<String> = row.get(6)?;

    // A subscription sub-record exists iff the reconciler has written an id.
    let subscription = match subscription_id {
        Some(id) => Some(Subscription {
            id,
            status: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            active: row.get(8)?,
            plan: Plan {
                id: row.get(9)?,
                name: row
                    .get::<_, Option<String>>(10)?
                    .unwrap_or_else(|| "Unknown Plan".to_string()),
            },
            next_billed_at: row.get(11)?,
            license_key: row.get(12)?,
        }),
        None => None,
    };

    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        company: row.get(3)?,
        role: row.get(4)?,
        email_verified: row.get(5)?,
        subscription,
        credit_usage: CreditUsage {
            used: row.get(13)?,
            total: row.get(14)?,
        },
        license_key: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
        last_login_at: row.get(18)?,
    })
}

pub fn create_account(conn: &Connection, input: &CreateAccount) -> Result<Account> {
    let id = EntityType::Account.gen_id();
    let ts = now();

    conn.execute(
        "INSERT INTO accounts (id, email, name, company, role, email_verified, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
        params![id, input.email, input.name, input.company, input.role, ts],
    )?;

    get_account_by_id(conn, &id)?
        .ok_or_else(|| crate::error::AppError::Internal("account vanished after insert".into()))
}

pub fn get_account_by_id(conn: &Connection, id: &str) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            &format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLS),
            params![id],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

/// Equality lookup by email, capped at two rows - enough to tell "unique
/// match" from "duplicates exist" without scanning further.
pub fn find_accounts_by_email(conn: &Connection, email: &str) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM accounts WHERE email = ?1 LIMIT 2",
        ACCOUNT_COLS
    ))?;
    let accounts = stmt
        .query_map(params![email], account_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(accounts)
}

/// Everything the reconciler writes on `subscription.created`.
#[derive(Debug)]
pub struct NewSubscription {
    pub subscription_id: String,
    pub status: String,
    pub active: bool,
    pub plan_id: Option<String>,
    pub plan_name: String,
    pub next_billed_at: Option<String>,
    pub license_key: String,
    pub credit_total: i64,
}

/// Write the subscription sub-record, reset credit usage, and assign the
/// license key in one statement. Returns false if the account is gone.
pub fn apply_subscription_created(
    conn: &Connection,
    account_id: &str,
    sub: &NewSubscription,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE accounts SET
            subscription_id = ?2,
            subscription_status = ?3,
            subscription_active = ?4,
            plan_id = ?5,
            plan_name = ?6,
            next_billed_at = ?7,
            subscription_license_key = ?8,
            credit_used = 0,
            credit_total = ?9,
            license_key = ?8,
            updated_at = ?10
         WHERE id = ?1",
        params![
            account_id,
            sub.subscription_id,
            sub.status,
            sub.active,
            sub.plan_id,
            sub.plan_name,
            sub.next_billed_at,
            sub.license_key,
            sub.credit_total,
            now(),
        ],
    )?;
    Ok(changed == 1)
}

/// Narrow-field update for status changes: only `subscription.status`,
/// `subscription.active`, and the updated-at timestamp. Credits and license
/// key are deliberately untouched.
pub fn update_subscription_status(
    conn: &Connection,
    account_id: &str,
    status: &str,
    active: bool,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE accounts SET
            subscription_status = ?2,
            subscription_active = ?3,
            updated_at = ?4
         WHERE id = ?1",
        params![account_id, status, active, now()],
    )?;
    Ok(changed == 1)
}

/// Record a webhook event id for replay prevention.
///
/// Returns true if this is the first delivery, false if the event was
/// already processed. Call inside the same transaction as the mutation so
/// a failed mutation rolls the claim back and the provider's retry works.
pub fn try_record_webhook_event(
    conn: &Connection,
    provider: &str,
    event_id: &str,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO webhook_events (id, provider, event_id, received_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![EntityType::WebhookEvent.gen_id(), provider, event_id, now()],
    )?;
    Ok(inserted == 1)
}

/// Count of processed webhook events (test/diagnostic helper).
pub fn count_webhook_events(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM webhook_events", [], |row| row.get(0))?;
    Ok(count)
}
