//! Wallet account entity.

use serde::{Deserialize, Serialize};

use corpcredit_auth::Role;
use corpcredit_core::{AccountId, Money};

/// A wallet account.
///
/// Created once at registration, mutated only through the ledger engine's
/// atomic operations, never deleted (soft-retained for audit). `balance` is
/// non-negative at all times; the store enforces this before any debit
/// commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique login name; the external auth collaborator looks accounts up by it.
    pub username: String,
    /// Fixed at creation, never changes.
    pub role: Role,
    pub balance: Money,
}

impl Account {
    /// Fresh account with a zero balance.
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: AccountId::new(),
            username: username.into(),
            role,
            balance: Money::ZERO,
        }
    }
}
