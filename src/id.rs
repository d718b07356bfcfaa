//! Prefixed ID generation for KeyMint entities.
//!
//! Account ids use a `km_` brand prefix to guarantee collision avoidance with
//! payment provider ids (Paddle's `sub_`, `ctm_`, `pri_`, `txn_`, etc.).
//!
//! Format: `km_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use uuid::Uuid;

/// All known entity prefixes for validation.
const ALL_PREFIXES: &[&str] = &["km_acct_", "km_evt_"];

/// Validate that a string is a valid KeyMint prefixed ID.
///
/// This is a cheap check to reject garbage before hitting the database.
/// Validates format: `km_{entity}_{32_hex_chars}`
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Entity types that have prefixed IDs in KeyMint.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    Account,
    WebhookEvent,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Account => "km_acct",
            Self::WebhookEvent => "km_evt",
        }
    }

    /// Generates a new prefixed ID for this entity type.
    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let id = EntityType::Account.gen_id();
        assert!(id.starts_with("km_acct_"));
        // km_acct_ (8 chars) + 32 hex chars = 40 chars total
        assert_eq!(id.len(), 40);
    }

    #[test]
    fn test_ids_are_unique() {
        let id1 = EntityType::Account.gen_id();
        let id2 = EntityType::Account.gen_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_is_valid_prefixed_id() {
        assert!(is_valid_prefixed_id("km_acct_a1b2c3d4e5f6789012345678901234ab"));
        assert!(is_valid_prefixed_id(&EntityType::Account.gen_id()));
        assert!(is_valid_prefixed_id(&EntityType::WebhookEvent.gen_id()));

        assert!(!is_valid_prefixed_id("")); // empty
        assert!(!is_valid_prefixed_id("a1b2c3d4-e5f6-7890-1234-567890123456")); // plain UUID
        assert!(!is_valid_prefixed_id("km_unknown_a1b2c3d4e5f6789012345678901234ab")); // unknown prefix
        assert!(!is_valid_prefixed_id("km_acct_a1b2c3d4")); // too short
        assert!(!is_valid_prefixed_id("km_acct_a1b2c3d4e5f6789012345678901234gg")); // non-hex
        assert!(!is_valid_prefixed_id("acct_a1b2c3d4e5f6789012345678901234ab")); // missing km_
    }
}
