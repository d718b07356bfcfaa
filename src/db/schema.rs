use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Accounts (one row per portal user; the flattened account document)
        -- Subscription columns are owned by the webhook reconciler.
        -- Email is indexed but NOT unique: the upstream identity store never
        -- enforced uniqueness, so the resolver has to cope with duplicates.
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            name TEXT NOT NULL,
            company TEXT,
            role TEXT,
            email_verified INTEGER NOT NULL DEFAULT 0,

            subscription_id TEXT,
            subscription_status TEXT,
            subscription_active INTEGER NOT NULL DEFAULT 0,
            plan_id TEXT,
            plan_name TEXT,
            next_billed_at TEXT,
            subscription_license_key TEXT,

            credit_used INTEGER NOT NULL DEFAULT 0,
            credit_total INTEGER NOT NULL DEFAULT 0,
            license_key TEXT,

            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            last_login_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_accounts_email ON accounts(email);
        CREATE INDEX IF NOT EXISTS idx_accounts_subscription ON accounts(subscription_id);

        -- Processed webhook events (replay/idempotency ledger)
        CREATE TABLE IF NOT EXISTS webhook_events (
            id TEXT PRIMARY KEY,
            provider TEXT NOT NULL,
            event_id TEXT NOT NULL,
            received_at INTEGER NOT NULL,
            UNIQUE(provider, event_id)
        );
        "#,
    )
}
