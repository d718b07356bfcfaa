use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::db::AppState;
use crate::error::Result;
use crate::models::TransactionView;
use crate::payments::PaddleTransaction;

use super::account::load_account;
use super::require_portal_key;

fn format_transaction(t: PaddleTransaction) -> TransactionView {
    // Provider reports grand_total in cents, as a string.
    let amount = t
        .details
        .as_ref()
        .and_then(|d| d.totals.as_ref())
        .and_then(|totals| totals.grand_total.as_deref())
        .and_then(|total| total.parse::<f64>().ok())
        .map(|cents| cents / 100.0)
        .unwrap_or(0.0);

    let description = t
        .items
        .first()
        .and_then(|i| i.price.as_ref())
        .and_then(|p| p.description.clone().or_else(|| p.name.clone()))
        .unwrap_or_else(|| "Payment".to_string());

    TransactionView {
        id: t.id,
        date: t.billed_at.or(t.created_at).unwrap_or_default(),
        description,
        amount,
        status: t.status.unwrap_or_else(|| "completed".to_string()),
        kind: "subscription".to_string(),
        invoice_url: None,
        currency: t.currency_code.unwrap_or_else(|| "USD".to_string()),
    }
}

/// Billing history for an account, fetched live from the payment provider.
///
/// The account's email is mapped to a provider customer first; an account
/// that never checked out simply has no customer and gets an empty list.
pub async fn list_account_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<TransactionView>>> {
    require_portal_key(&headers, &state)?;

    let account = load_account(&state, &id)?;

    let Some(customer) = state.paddle.get_customer_by_email(&account.email).await? else {
        tracing::debug!("No provider customer for account {}", account.id);
        return Ok(Json(Vec::new()));
    };

    let transactions = state.paddle.list_transactions(&customer.id).await?;

    Ok(Json(
        transactions.into_iter().map(format_transaction).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction_from_json(value: serde_json::Value) -> PaddleTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_populated_transaction() {
        let t = transaction_from_json(serde_json::json!({
            "id": "txn_1",
            "status": "paid",
            "currency_code": "EUR",
            "billed_at": "2025-05-01T00:00:00Z",
            "created_at": "2025-04-30T23:59:00Z",
            "details": { "totals": { "grand_total": "1999" } },
            "items": [ { "price": { "id": "plan_pro", "description": "Pro" } } ]
        }));

        let view = format_transaction(t);
        assert_eq!(view.id, "txn_1");
        assert_eq!(view.amount, 19.99);
        assert_eq!(view.description, "Pro");
        assert_eq!(view.date, "2025-05-01T00:00:00Z");
        assert_eq!(view.status, "paid");
        assert_eq!(view.currency, "EUR");
    }

    #[test]
    fn test_missing_totals_formats_as_zero() {
        let t = transaction_from_json(serde_json::json!({ "id": "txn_2" }));

        let view = format_transaction(t);
        assert_eq!(view.amount, 0.0);
        assert_eq!(view.status, "completed");
        assert_eq!(view.currency, "USD");
    }

    #[test]
    fn test_unparseable_total_formats_as_zero() {
        let t = transaction_from_json(serde_json::json!({
            "id": "txn_3",
            "details": { "totals": { "grand_total": "not a number" } }
        }));

        assert_eq!(format_transaction(t).amount, 0.0);
    }

    #[test]
    fn test_description_falls_back_to_price_name() {
        let t = transaction_from_json(serde_json::json!({
            "id": "txn_4",
            "items": [ { "price": { "id": "plan_pro", "name": "Pro Plan" } } ]
        }));

        assert_eq!(format_transaction(t).description, "Pro Plan");
    }

    #[test]
    fn test_description_defaults_to_payment() {
        let t = transaction_from_json(serde_json::json!({
            "id": "txn_5",
            "items": []
        }));

        assert_eq!(format_transaction(t).description, "Payment");
    }

    #[test]
    fn test_date_falls_back_to_created_at() {
        let t = transaction_from_json(serde_json::json!({
            "id": "txn_6",
            "created_at": "2025-03-01T12:00:00Z"
        }));

        assert_eq!(format_transaction(t).date, "2025-03-01T12:00:00Z");
    }
}
