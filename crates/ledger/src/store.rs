//! Storage contract for accounts and the transaction log.
//!
//! A single capability trait with an in-memory implementation (tests/dev) and
//! a durable one (Postgres), selected at startup. All balance mutation goes
//! through the store's atomic operations; the engine never does read-then-write
//! around them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use corpcredit_auth::Role;
use corpcredit_core::{AccountId, LedgerResult, Money};

use crate::account::Account;
use crate::transaction::Transaction;

/// Which side of a transaction an account is queried as.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransactionParty {
    Payer,
    Payee,
    Either,
}

/// Optional inclusive time window for transaction listings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| ts >= from) && self.to.is_none_or(|to| ts <= to)
    }
}

/// Durable account table + append-only transaction log.
///
/// Concurrency contract: `apply_delta`, `set_balance`, and `settle_payment`
/// serialize per account (row lock or single critical section); distinct
/// accounts may mutate in parallel. `settle_payment` is one atomic unit — no
/// reader ever observes the debit without its transaction row or vice versa.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Register a new account with a zero balance.
    /// Fails with `UsernameTaken` on a username conflict.
    async fn create_account(&self, username: &str, role: Role) -> LedgerResult<Account>;

    async fn account(&self, id: AccountId) -> LedgerResult<Account>;

    /// Unique username lookup (consumed by the external auth collaborator).
    async fn account_by_username(&self, username: &str) -> LedgerResult<Option<Account>>;

    /// All accounts holding `role`; order irrelevant.
    async fn accounts_by_role(&self, role: Role) -> LedgerResult<Vec<Account>>;

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>>;

    /// Atomically apply a signed delta to one balance.
    ///
    /// Fails with `InsufficientBalance` (leaving the balance untouched) when
    /// `current + delta < 0`.
    async fn apply_delta(&self, id: AccountId, delta: Money) -> LedgerResult<Account>;

    /// Administrative overwrite, bypassing delta arithmetic.
    /// Rejects negative literal input with `InvalidAmount`.
    async fn set_balance(&self, id: AccountId, value: Money) -> LedgerResult<Account>;

    /// Bulk overwrite for every account holding `role`; returns the count.
    async fn set_balance_for_role(&self, role: Role, value: Money) -> LedgerResult<u64>;

    /// Debit the payer and append a `Completed` transaction as one atomic unit.
    ///
    /// Generates a fresh transaction id; on the astronomically unlikely
    /// collision with a stored id, regenerates and retries internally rather
    /// than surfacing `DuplicateTransactionId`.
    async fn settle_payment(
        &self,
        payer_id: AccountId,
        payee_id: AccountId,
        amount: Money,
    ) -> LedgerResult<(Account, Transaction)>;

    /// Transactions touching `id` on the given side, timestamp descending.
    async fn transactions_for_account(
        &self,
        id: AccountId,
        party: TransactionParty,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Full log, optionally windowed, timestamp descending. Read-only
    /// reporting surface (CSV/PDF generators consume it, never mutate).
    async fn all_transactions(&self, range: TimeRange) -> LedgerResult<Vec<Transaction>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unbounded_range_contains_everything() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(TimeRange::default().contains(ts));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let from = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let range = TimeRange {
            from: Some(from),
            to: Some(to),
        };

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(from - chrono::Duration::seconds(1)));
        assert!(!range.contains(to + chrono::Duration::seconds(1)));
    }
}
