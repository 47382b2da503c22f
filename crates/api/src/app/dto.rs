use chrono::{DateTime, Utc};
use serde::Deserialize;

use corpcredit_auth::Role;
use corpcredit_core::{AccountId, Money};
use corpcredit_ledger::TimeRange;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct FundWalletRequest {
    pub account_id: AccountId,
    /// Signed 2-decimal string, e.g. `"50.00"` or `"-10.00"`.
    pub amount: Money,
}

/// Balance overwrite: either one account or every account of a role.
#[derive(Debug, Deserialize)]
pub struct ResetWalletRequest {
    pub account_id: Option<AccountId>,
    pub role: Option<Role>,
    pub balance: Money,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub vendor_id: AccountId,
    pub amount: Money,
}

#[derive(Debug, Deserialize)]
pub struct TransactionWindowQuery {
    /// RFC3339 inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// RFC3339 inclusive upper bound.
    pub to: Option<DateTime<Utc>>,
}

impl TransactionWindowQuery {
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            from: self.from,
            to: self.to,
        }
    }
}
