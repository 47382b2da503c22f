//! In-memory ledger store.
//!
//! Intended for tests/dev. One mutex guards the whole state, which trivially
//! gives the contract's guarantees: per-account mutations serialize and
//! `settle_payment` is a single critical section, so no reader can observe a
//! debit without its transaction row.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use corpcredit_auth::Role;
use corpcredit_core::{AccountId, LedgerError, LedgerResult, Money, TransactionId};
use corpcredit_ledger::{
    Account, LedgerStore, TimeRange, Transaction, TransactionParty, TransactionStatus,
};

use super::MAX_ID_RETRIES;

#[derive(Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    transactions: Vec<Transaction>,
    transaction_ids: HashSet<TransactionId>,
    next_row_id: i64,
}

/// In-memory `LedgerStore`. Not optimized for performance.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::storage("ledger state lock poisoned"))
    }

    fn apply_delta_locked(
        state: &mut State,
        id: AccountId,
        delta: Money,
    ) -> LedgerResult<Account> {
        let account = state.accounts.get_mut(&id).ok_or(LedgerError::NotFound)?;

        let new_balance = account
            .balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;
        if new_balance.is_negative() {
            return Err(LedgerError::InsufficientBalance);
        }

        account.balance = new_balance;
        Ok(account.clone())
    }

    fn fresh_transaction_id(state: &State) -> LedgerResult<TransactionId> {
        for _ in 0..MAX_ID_RETRIES {
            let candidate = TransactionId::new();
            if !state.transaction_ids.contains(&candidate) {
                return Ok(candidate);
            }
            tracing::warn!("transaction id collision, regenerating");
        }
        tracing::error!("transaction id retries exhausted");
        Err(LedgerError::settlement("could not generate a unique transaction id"))
    }

    fn descending(mut rows: Vec<Transaction>) -> Vec<Transaction> {
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_account(&self, username: &str, role: Role) -> LedgerResult<Account> {
        let mut state = self.lock()?;
        if state.accounts.values().any(|a| a.username == username) {
            return Err(LedgerError::UsernameTaken);
        }

        let account = Account::new(username, role);
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn account(&self, id: AccountId) -> LedgerResult<Account> {
        let state = self.lock()?;
        state.accounts.get(&id).cloned().ok_or(LedgerError::NotFound)
    }

    async fn account_by_username(&self, username: &str) -> LedgerResult<Option<Account>> {
        let state = self.lock()?;
        Ok(state
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn accounts_by_role(&self, role: Role) -> LedgerResult<Vec<Account>> {
        let state = self.lock()?;
        Ok(state
            .accounts
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        let state = self.lock()?;
        Ok(state.accounts.values().cloned().collect())
    }

    async fn apply_delta(&self, id: AccountId, delta: Money) -> LedgerResult<Account> {
        let mut state = self.lock()?;
        Self::apply_delta_locked(&mut state, id, delta)
    }

    async fn set_balance(&self, id: AccountId, value: Money) -> LedgerResult<Account> {
        if value.is_negative() {
            return Err(LedgerError::invalid_amount("balance cannot be negative"));
        }

        let mut state = self.lock()?;
        let account = state.accounts.get_mut(&id).ok_or(LedgerError::NotFound)?;
        account.balance = value;
        Ok(account.clone())
    }

    async fn set_balance_for_role(&self, role: Role, value: Money) -> LedgerResult<u64> {
        if value.is_negative() {
            return Err(LedgerError::invalid_amount("balance cannot be negative"));
        }

        let mut state = self.lock()?;
        let mut count = 0;
        for account in state.accounts.values_mut().filter(|a| a.role == role) {
            account.balance = value;
            count += 1;
        }
        Ok(count)
    }

    async fn settle_payment(
        &self,
        payer_id: AccountId,
        payee_id: AccountId,
        amount: Money,
    ) -> LedgerResult<(Account, Transaction)> {
        if !amount.is_positive() {
            return Err(LedgerError::invalid_amount("payment amount must be positive"));
        }

        let mut state = self.lock()?;
        if !state.accounts.contains_key(&payee_id) {
            return Err(LedgerError::NotFound);
        }

        // Debit and append commit inside the same critical section; the id is
        // reserved first so a generation failure leaves the balance untouched.
        let transaction_id = Self::fresh_transaction_id(&state)?;
        let payer = Self::apply_delta_locked(&mut state, payer_id, amount.negated())?;

        state.next_row_id += 1;
        let transaction = Transaction {
            id: state.next_row_id,
            transaction_id,
            payer_id,
            payee_id,
            amount,
            status: TransactionStatus::Completed,
            timestamp: Utc::now(),
        };

        state.transaction_ids.insert(transaction_id);
        state.transactions.push(transaction.clone());

        Ok((payer, transaction))
    }

    async fn transactions_for_account(
        &self,
        id: AccountId,
        party: TransactionParty,
    ) -> LedgerResult<Vec<Transaction>> {
        let state = self.lock()?;
        let rows = state
            .transactions
            .iter()
            .filter(|t| match party {
                TransactionParty::Payer => t.payer_id == id,
                TransactionParty::Payee => t.payee_id == id,
                TransactionParty::Either => t.payer_id == id || t.payee_id == id,
            })
            .cloned()
            .collect();
        Ok(Self::descending(rows))
    }

    async fn all_transactions(&self, range: TimeRange) -> LedgerResult<Vec<Transaction>> {
        let state = self.lock()?;
        let rows = state
            .transactions
            .iter()
            .filter(|t| range.contains(t.timestamp))
            .cloned()
            .collect();
        Ok(Self::descending(rows))
    }
}
