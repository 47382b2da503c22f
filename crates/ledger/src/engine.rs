//! Ledger engine: funding and payment orchestration.
//!
//! Both operations follow the same shape: validate inputs → atomic store
//! mutation → best-effort notification fan-out. Notifications are emitted
//! strictly after the mutation committed and can neither fail nor block it.

use std::sync::Arc;

use corpcredit_auth::Role;
use corpcredit_core::{AccountId, LedgerError, LedgerResult, Money};
use corpcredit_notify::{Notification, Notifier};

use crate::account::Account;
use crate::store::{LedgerStore, TimeRange, TransactionParty};
use crate::transaction::Transaction;

/// Orchestrates ledger mutations against an injected store and notifier.
///
/// Holds no mutable state of its own; every instance is independent, so tests
/// construct isolated engines over fresh stores.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Admin-only: credit or debit a wallet directly from the treasury.
    ///
    /// A balance-only event: no transaction row is written, but the target
    /// gets a `wallet_update` push. `amount` may be any non-zero signed
    /// 2-decimal value; a debit that would go negative fails with
    /// `InsufficientBalance`.
    pub async fn fund_account(
        &self,
        actor: Role,
        target: AccountId,
        amount: Money,
    ) -> LedgerResult<Account> {
        if actor != Role::Admin {
            return Err(LedgerError::Unauthorized);
        }
        if amount.is_zero() {
            return Err(LedgerError::invalid_amount("funding amount must be non-zero"));
        }

        let account = self.store.apply_delta(target, amount).await?;

        tracing::info!(
            account_id = %account.id,
            %amount,
            balance = %account.balance,
            "wallet funded"
        );

        let message = if amount.is_positive() {
            format!("Wallet credited: {amount}")
        } else {
            format!("Wallet debited: {}", amount.negated())
        };
        self.notifier
            .dispatch(Notification::wallet_update(account.id, message));

        Ok(account)
    }

    /// Employee-only: pay a vendor out of the payer's wallet.
    ///
    /// Debit and transaction append commit as one atomic unit inside the
    /// store; an `InsufficientBalance` debit leaves no row and no
    /// notification. The payee's stored balance is deliberately not credited —
    /// vendor earnings are derived by summing completed transactions.
    pub async fn pay(
        &self,
        actor: Role,
        payer_id: AccountId,
        payee_id: AccountId,
        amount: Money,
    ) -> LedgerResult<Transaction> {
        if actor != Role::Employee {
            return Err(LedgerError::Unauthorized);
        }
        if !amount.is_positive() {
            return Err(LedgerError::invalid_amount("payment amount must be positive"));
        }

        // Role shape is re-validated here even though the policy gate already
        // ran: the gate classifies the caller, not the referenced accounts.
        let payer = self.store.account(payer_id).await?;
        if payer.role != Role::Employee {
            return Err(LedgerError::Unauthorized);
        }
        let payee = self.store.account(payee_id).await?;
        if payee.role != Role::Vendor {
            return Err(LedgerError::Unauthorized);
        }

        let (payer, transaction) = self.store.settle_payment(payer_id, payee_id, amount).await?;

        tracing::info!(
            transaction_id = %transaction.transaction_id,
            payer_id = %payer.id,
            payee_id = %payee.id,
            %amount,
            payer_balance = %payer.balance,
            "payment settled"
        );

        let txn_id = transaction.transaction_id;
        self.notifier.dispatch(Notification::transaction(
            payer.id,
            format!("Payment of {amount} sent (txn {txn_id})"),
        ));
        self.notifier.dispatch(Notification::transaction(
            payee.id,
            format!("Payment of {amount} received (txn {txn_id})"),
        ));

        Ok(transaction)
    }

    /// Admin-only: register a new account with a zero balance.
    pub async fn create_account(
        &self,
        actor: Role,
        username: &str,
        role: Role,
    ) -> LedgerResult<Account> {
        if actor != Role::Admin {
            return Err(LedgerError::Unauthorized);
        }
        let account = self.store.create_account(username, role).await?;
        tracing::info!(account_id = %account.id, role = %account.role, "account registered");
        Ok(account)
    }

    /// Admin-only: overwrite one balance, bypassing delta arithmetic.
    pub async fn reset_balance(
        &self,
        actor: Role,
        target: AccountId,
        value: Money,
    ) -> LedgerResult<Account> {
        if actor != Role::Admin {
            return Err(LedgerError::Unauthorized);
        }
        let account = self.store.set_balance(target, value).await?;
        self.notifier.dispatch(Notification::wallet_update(
            account.id,
            format!("Wallet balance reset to {}", account.balance),
        ));
        Ok(account)
    }

    /// Admin-only: overwrite every balance of a role; returns the count.
    pub async fn reset_balances_for_role(
        &self,
        actor: Role,
        role: Role,
        value: Money,
    ) -> LedgerResult<u64> {
        if actor != Role::Admin {
            return Err(LedgerError::Unauthorized);
        }
        let count = self.store.set_balance_for_role(role, value).await?;
        tracing::info!(%role, %value, count, "bulk balance reset");
        Ok(count)
    }

    pub async fn account(&self, id: AccountId) -> LedgerResult<Account> {
        self.store.account(id).await
    }

    pub async fn accounts(&self) -> LedgerResult<Vec<Account>> {
        self.store.list_accounts().await
    }

    /// Vendor directory (any authenticated caller).
    pub async fn vendors(&self) -> LedgerResult<Vec<Account>> {
        self.store.accounts_by_role(Role::Vendor).await
    }

    pub async fn transactions_for_account(
        &self,
        id: AccountId,
        party: TransactionParty,
    ) -> LedgerResult<Vec<Transaction>> {
        self.store.transactions_for_account(id, party).await
    }

    pub async fn all_transactions(&self, range: TimeRange) -> LedgerResult<Vec<Transaction>> {
        self.store.all_transactions(range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use corpcredit_notify::NullNotifier;

    /// Validation-path stub: every operation that reaches storage panics, so
    /// these tests prove the engine rejects bad input *before* any mutation.
    struct UnreachableStore;

    #[async_trait]
    impl LedgerStore for UnreachableStore {
        async fn create_account(&self, _: &str, _: Role) -> LedgerResult<Account> {
            panic!("store must not be reached")
        }
        async fn account(&self, _: AccountId) -> LedgerResult<Account> {
            panic!("store must not be reached")
        }
        async fn account_by_username(&self, _: &str) -> LedgerResult<Option<Account>> {
            panic!("store must not be reached")
        }
        async fn accounts_by_role(&self, _: Role) -> LedgerResult<Vec<Account>> {
            panic!("store must not be reached")
        }
        async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
            panic!("store must not be reached")
        }
        async fn apply_delta(&self, _: AccountId, _: Money) -> LedgerResult<Account> {
            panic!("store must not be reached")
        }
        async fn set_balance(&self, _: AccountId, _: Money) -> LedgerResult<Account> {
            panic!("store must not be reached")
        }
        async fn set_balance_for_role(&self, _: Role, _: Money) -> LedgerResult<u64> {
            panic!("store must not be reached")
        }
        async fn settle_payment(
            &self,
            _: AccountId,
            _: AccountId,
            _: Money,
        ) -> LedgerResult<(Account, Transaction)> {
            panic!("store must not be reached")
        }
        async fn transactions_for_account(
            &self,
            _: AccountId,
            _: TransactionParty,
        ) -> LedgerResult<Vec<Transaction>> {
            panic!("store must not be reached")
        }
        async fn all_transactions(&self, _: TimeRange) -> LedgerResult<Vec<Transaction>> {
            panic!("store must not be reached")
        }
    }

    fn engine() -> LedgerEngine {
        LedgerEngine::new(Arc::new(UnreachableStore), Arc::new(NullNotifier))
    }

    #[tokio::test]
    async fn fund_rejects_non_admin_actor() {
        let err = engine()
            .fund_account(Role::Employee, AccountId::new(), Money::from_cents(100))
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
    }

    #[tokio::test]
    async fn fund_rejects_zero_amount() {
        let err = engine()
            .fund_account(Role::Admin, AccountId::new(), Money::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn pay_rejects_non_employee_actor() {
        let err = engine()
            .pay(Role::Vendor, AccountId::new(), AccountId::new(), Money::from_cents(100))
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
    }

    #[tokio::test]
    async fn pay_rejects_non_positive_amount() {
        for cents in [0, -100] {
            let err = engine()
                .pay(
                    Role::Employee,
                    AccountId::new(),
                    AccountId::new(),
                    Money::from_cents(cents),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::InvalidAmount(_)));
        }
    }

    #[tokio::test]
    async fn admin_resets_reject_other_actors() {
        let err = engine()
            .reset_balances_for_role(Role::Vendor, Role::Employee, Money::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
    }
}
