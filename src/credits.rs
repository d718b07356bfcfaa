//! Credit allocation per billing plan.
//!
//! Consulted only at subscription-creation time. The mapping is keyed by the
//! provider's price id; unknown plans grant zero credits rather than erroring,
//! so a misconfigured plan produces a subscribed-but-empty account instead of
//! a dropped webhook.

/// Credits granted per plan price id.
const CREDIT_TABLE: &[(&str, i64)] = &[
    ("plan_starter", 100),
    ("plan_pro", 500),
    ("plan_enterprise", 2000),
];

/// Look up the credit grant for a plan price id. Unknown ids map to 0.
pub fn allocation_for(price_id: &str) -> i64 {
    CREDIT_TABLE
        .iter()
        .find(|(id, _)| *id == price_id)
        .map(|(_, credits)| *credits)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_plans() {
        assert_eq!(allocation_for("plan_starter"), 100);
        assert_eq!(allocation_for("plan_pro"), 500);
        assert_eq!(allocation_for("plan_enterprise"), 2000);
    }

    #[test]
    fn test_unknown_plans_grant_zero() {
        assert_eq!(allocation_for("plan_unlimited"), 0);
        assert_eq!(allocation_for(""), 0);
        assert_eq!(allocation_for("PLAN_STARTER"), 0); // exact match only
    }
}
