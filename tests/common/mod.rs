//! Test utilities and fixtures for KeyMint integration tests

#![allow(dead_code)]

use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::sync::Arc;

pub use keymint::config::PaddleConfig;
pub use keymint::db::{init_db, queries, AppState};
pub use keymint::handlers;
pub use keymint::models::*;
pub use keymint::payments::PaddleClient;

pub const TEST_WEBHOOK_SECRET: &str = "pdl_test_webhook_secret";
pub const TEST_PORTAL_KEY: &str = "portal_test_key";

pub fn test_paddle_config() -> PaddleConfig {
    PaddleConfig {
        webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        api_key: None,
        api_base_url: "https://sandbox-api.paddle.com".to_string(),
        signature_header: "paddle-signature".to_string(),
        timestamp_header: "paddle-timestamp".to_string(),
    }
}

pub fn test_paddle_client() -> PaddleClient {
    PaddleClient::new(test_paddle_config())
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState for testing with an in-memory database.
///
/// The pool is capped at one connection: each pooled in-memory SQLite
/// connection would otherwise be a separate empty database.
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        paddle: Arc::new(test_paddle_client()),
        portal_api_key: Some(TEST_PORTAL_KEY.to_string()),
    }
}

/// Create a Router with all endpoints wired to the given state
pub fn test_app(state: AppState) -> Router {
    handlers::router().with_state(state)
}

/// Create a test account
pub fn create_test_account(conn: &Connection, email: &str, name: &str) -> Account {
    let input = CreateAccount {
        email: email.to_string(),
        name: name.to_string(),
        company: None,
        role: None,
    };
    queries::create_account(conn, &input).expect("Failed to create test account")
}

/// Get the current Unix timestamp as a string (for webhook signature tests)
pub fn current_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Compute the expected webhook signature: hex HMAC-SHA256 over
/// `{timestamp}.{payload}`
pub fn sign_payload(payload: &[u8], timestamp: &str, secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a `subscription.created` payload in the provider's shape
pub fn created_event(
    subscription_id: &str,
    price_id: &str,
    plan_name: &str,
    email: &str,
    user_id: Option<&str>,
    event_id: Option<&str>,
) -> serde_json::Value {
    let mut custom_data = serde_json::Map::new();
    if let Some(uid) = user_id {
        custom_data.insert("userId".to_string(), serde_json::json!(uid));
    }

    let mut event = serde_json::json!({
        "event_type": "subscription.created",
        "data": {
            "id": subscription_id,
            "customer_id": "ctm_1",
            "status": "active",
            "customer": { "email": email },
            "items": [ { "price": { "id": price_id, "description": plan_name } } ],
            "next_billed_at": "2025-06-01",
            "custom_data": custom_data,
        }
    });
    if let Some(eid) = event_id {
        event["event_id"] = serde_json::json!(eid);
    }
    event
}

/// Build a `subscription.updated` payload
pub fn updated_event(
    subscription_id: &str,
    status: &str,
    email: &str,
    user_id: Option<&str>,
) -> serde_json::Value {
    let mut custom_data = serde_json::Map::new();
    if let Some(uid) = user_id {
        custom_data.insert("userId".to_string(), serde_json::json!(uid));
    }

    serde_json::json!({
        "event_type": "subscription.updated",
        "data": {
            "id": subscription_id,
            "status": status,
            "customer": { "email": email },
            "custom_data": custom_data,
        }
    })
}

/// Build a `subscription.cancelled` payload
pub fn cancelled_event(
    subscription_id: &str,
    email: &str,
    user_id: Option<&str>,
) -> serde_json::Value {
    let mut custom_data = serde_json::Map::new();
    if let Some(uid) = user_id {
        custom_data.insert("userId".to_string(), serde_json::json!(uid));
    }

    serde_json::json!({
        "event_type": "subscription.cancelled",
        "data": {
            "id": subscription_id,
            "status": "cancelled",
            "customer": { "email": email },
            "custom_data": custom_data,
        }
    })
}
