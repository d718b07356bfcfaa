mod account;
mod transaction;

pub use account::{Account, CreateAccount, CreditUsage, Plan, Subscription, SubscriptionStatus};
pub use transaction::TransactionView;
