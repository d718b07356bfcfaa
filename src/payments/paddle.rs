use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::PaddleConfig;
use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Paddle client: webhook signature verification (local, CPU-only) plus the
/// handful of API calls the portal proxies.
#[derive(Debug, Clone)]
pub struct PaddleClient {
    client: Client,
    config: PaddleConfig,
}

impl PaddleClient {
    pub fn new(config: PaddleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Name of the request header carrying the hex HMAC signature.
    pub fn signature_header(&self) -> &str {
        &self.config.signature_header
    }

    /// Name of the request header carrying the signing timestamp.
    pub fn timestamp_header(&self) -> &str {
        &self.config.timestamp_header
    }

    /// Verify an inbound webhook.
    ///
    /// Expected signature = hex(HMAC-SHA256(secret, "{timestamp}.{payload}")).
    /// Payment-event authenticity is the only security boundary in this
    /// subsystem, so this fails closed on every degenerate input: missing
    /// signature header, missing timestamp header, or no configured secret
    /// all return false. It never errors or panics.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> bool {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return false;
        };

        let Some(ref secret) = self.config.webhook_secret else {
            tracing::warn!("Webhook received but PADDLE_WEBHOOK_SECRET is not configured");
            return false;
        };

        // HMAC accepts keys of any length; new_from_slice cannot fail here.
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        // Constant-time comparison to prevent timing attacks. The length
        // check is not constant-time, but signature length is not secret
        // (always 64 hex chars for SHA-256).
        let expected_bytes = expected.as_bytes();
        let provided_bytes = signature.as_bytes();
        if expected_bytes.len() != provided_bytes.len() {
            return false;
        }

        expected_bytes.ct_eq(provided_bytes).into()
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Provider("PADDLE_API_KEY not configured".into()))
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Look up an active Paddle customer by email. Returns None when no
    /// customer matches (a portal account that never checked out).
    pub async fn get_customer_by_email(&self, email: &str) -> Result<Option<PaddleCustomer>> {
        let response = self
            .client
            .get(self.api_url("customers"))
            .bearer_auth(self.api_key()?)
            .query(&[("email", email), ("status", "active")])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("customer lookup failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "customer lookup returned {}: {}",
                status, body
            )));
        }

        let list: PaddleList<PaddleCustomer> = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("invalid customer response: {}", e)))?;

        Ok(list.data.into_iter().next())
    }

    /// List recent transactions for a customer.
    pub async fn list_transactions(&self, customer_id: &str) -> Result<Vec<PaddleTransaction>> {
        let response = self
            .client
            .get(self.api_url("transactions"))
            .bearer_auth(self.api_key()?)
            .query(&[("customer_id", customer_id), ("per_page", "50")])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("transaction list failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "transaction list returned {}: {}",
                status, body
            )));
        }

        let list: PaddleList<PaddleTransaction> = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("invalid transaction response: {}", e)))?;

        Ok(list.data)
    }

    /// Cancel a subscription, immediately or at the end of the billing period.
    pub async fn cancel_subscription(&self, subscription_id: &str, immediate: bool) -> Result<()> {
        let effective_from = if immediate {
            "immediately"
        } else {
            "next_billing_period"
        };

        let response = self
            .client
            .post(self.api_url(&format!("subscriptions/{}/cancel", subscription_id)))
            .bearer_auth(self.api_key()?)
            .json(&serde_json::json!({ "effective_from": effective_from }))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("cancel request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "cancel returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// Paddle list envelope: `{"data": [...]}`
#[derive(Debug, Deserialize)]
struct PaddleList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaddleCustomer {
    pub id: String,
    pub email: Option<String>,
}

// ============ webhook payload ============

/// Raw webhook envelope. `data` stays untyped here and is parsed once, per
/// event kind, at the dispatcher boundary.
#[derive(Debug, Deserialize)]
pub struct PaddleWebhookEvent {
    pub event_type: String,
    /// Provider's unique event id (used for replay prevention when present)
    #[serde(default)]
    pub event_id: Option<String>,
    pub data: serde_json::Value,
}

/// Subscription object embedded in lifecycle events.
#[derive(Debug, Deserialize)]
pub struct PaddleSubscriptionData {
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer: Option<PaddleEventCustomer>,
    #[serde(default)]
    pub items: Vec<PaddleItem>,
    #[serde(default)]
    pub next_billed_at: Option<String>,
    #[serde(default)]
    pub custom_data: Option<PaddleCustomData>,
}

#[derive(Debug, Deserialize)]
pub struct PaddleEventCustomer {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaddleItem {
    #[serde(default)]
    pub price: Option<PaddlePrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaddlePrice {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Correlation data the checkout initiator attached; round-tripped by the
/// provider so webhooks can be mapped back to an account without email.
#[derive(Debug, Deserialize)]
pub struct PaddleCustomData {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

// ============ transactions ============

#[derive(Debug, Deserialize)]
pub struct PaddleTransaction {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub billed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub details: Option<PaddleTransactionDetails>,
    #[serde(default)]
    pub items: Vec<PaddleItem>,
}

#[derive(Debug, Deserialize)]
pub struct PaddleTransactionDetails {
    #[serde(default)]
    pub totals: Option<PaddleTotals>,
}

#[derive(Debug, Deserialize)]
pub struct PaddleTotals {
    /// Grand total in cents, as a string in Paddle's API
    #[serde(default)]
    pub grand_total: Option<String>,
}
