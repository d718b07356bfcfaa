use serde::Serialize;

/// Transaction shaped for the portal's billing view.
///
/// Built from the payment provider's transaction list; append-only from the
/// portal's perspective and used purely for display.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: String,
    /// Billed-at timestamp (falls back to created-at), provider format
    pub date: String,
    pub description: String,
    /// Major currency units (provider reports cents)
    pub amount: f64,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "invoiceUrl")]
    pub invoice_url: Option<String>,
    pub currency: String,
}
