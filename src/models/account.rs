use serde::{Deserialize, Serialize};

/// Subscription status as reported by the payment provider.
///
/// The raw provider string is kept alongside the parsed variant so unknown
/// statuses survive a round-trip through the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Cancelled,
    Paused,
    Unknown(String),
}

impl SubscriptionStatus {
    /// Parse a provider status string, case-insensitively.
    pub fn from_provider(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "trialing" => Self::Trialing,
            "past_due" => Self::PastDue,
            "cancelled" | "canceled" => Self::Cancelled,
            "paused" => Self::Paused,
            _ => Self::Unknown(status.to_string()),
        }
    }

    /// The derived `active` flag. True exactly for the allow-list
    /// {active, trialing, past_due}; everything else (cancelled, paused,
    /// unrecognized) is inactive.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing | Self::PastDue)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
            Self::Paused => "paused",
            Self::Unknown(s) => s,
        }
    }
}

/// Subscription sub-record embedded in an account.
///
/// Created when the provider reports a new subscription, mutated on every
/// later status-changing event for the same subscription id, never deleted -
/// cancellation only flips `status`/`active` so history is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Provider subscription id (e.g. `sub_...`)
    pub id: String,
    /// Raw provider status string
    pub status: String,
    /// Derived from `status` through the activity allow-list; always a
    /// boolean, never a string
    pub active: bool,
    pub plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_billed_at: Option<String>,
    /// License key issued when this subscription was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// Metered credit usage for an account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreditUsage {
    pub used: i64,
    pub total: i64,
}

/// Account record - one per end user of the portal.
///
/// Subscription-related fields are owned exclusively by the webhook
/// reconciler; the portal only reads them. Profile fields (name, company,
/// role) are written through a separate path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    /// Lookup key for email-based resolution. Indexed but not unique.
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    pub credit_usage: CreditUsage,
    /// Opaque entitlement token for the desktop client (copy of the active
    /// subscription's key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_allow_list() {
        assert!(SubscriptionStatus::from_provider("active").is_active());
        assert!(SubscriptionStatus::from_provider("trialing").is_active());
        assert!(SubscriptionStatus::from_provider("past_due").is_active());

        assert!(!SubscriptionStatus::from_provider("cancelled").is_active());
        assert!(!SubscriptionStatus::from_provider("paused").is_active());
        assert!(!SubscriptionStatus::from_provider("deleted").is_active());
        assert!(!SubscriptionStatus::from_provider("").is_active());
    }

    #[test]
    fn test_status_parse_case_insensitive() {
        assert!(SubscriptionStatus::from_provider("Active").is_active());
        assert!(SubscriptionStatus::from_provider("PAST_DUE").is_active());
        assert!(!SubscriptionStatus::from_provider("Cancelled").is_active());
    }

    #[test]
    fn test_unknown_status_round_trips() {
        let status = SubscriptionStatus::from_provider("on_hold");
        assert_eq!(status, SubscriptionStatus::Unknown("on_hold".to_string()));
        assert_eq!(status.as_str(), "on_hold");
        assert!(!status.is_active());
    }

    #[test]
    fn test_us_spelling_accepted() {
        // Paddle documents "canceled" in some API versions.
        assert_eq!(
            SubscriptionStatus::from_provider("canceled"),
            SubscriptionStatus::Cancelled
        );
    }
}
