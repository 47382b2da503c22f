//! Postgres-backed ledger store.
//!
//! Row-level locking (`SELECT ... FOR UPDATE`) wraps every balance mutation,
//! and `settle_payment` runs debit + insert inside one database transaction,
//! so either both commit or neither does.
//!
//! ## Error Mapping
//!
//! | PostgreSQL error code | Constraint | LedgerError |
//! |-----------------------|-----------|-------------|
//! | `23505` | `accounts_username_key` | `UsernameTaken` |
//! | `23505` | `transactions_transaction_id_key` | `DuplicateTransactionId` (retried) |
//! | `23514` | `balance_cents >= 0` | `InsufficientBalance` |
//! | other | — | `Storage` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use corpcredit_auth::Role;
use corpcredit_core::{AccountId, LedgerError, LedgerResult, Money, TransactionId};
use corpcredit_ledger::{
    Account, LedgerStore, TimeRange, Transaction, TransactionParty, TransactionStatus,
};

use super::MAX_ID_RETRIES;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    balance_cents BIGINT NOT NULL DEFAULT 0 CHECK (balance_cents >= 0)
);

CREATE TABLE IF NOT EXISTS transactions (
    id BIGSERIAL PRIMARY KEY,
    transaction_id UUID NOT NULL UNIQUE,
    payer_id UUID NOT NULL REFERENCES accounts (id),
    payee_id UUID NOT NULL REFERENCES accounts (id),
    amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
    status TEXT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS transactions_payer_idx ON transactions (payer_id, timestamp DESC);
CREATE INDEX IF NOT EXISTS transactions_payee_idx ON transactions (payee_id, timestamp DESC);
"#;

/// Durable `LedgerStore` on PostgreSQL.
///
/// `Send + Sync`; all operations go through the sqlx connection pool.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist yet.
    pub async fn migrate(&self) -> LedgerResult<()> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&mut *conn).await.map_err(db_err)?;
        }
        Ok(())
    }

    /// One settlement attempt under a fresh transaction id.
    ///
    /// `DuplicateTransactionId` aborts the whole database transaction, so the
    /// caller retries from scratch with a new id.
    async fn try_settle(
        &self,
        payer_id: AccountId,
        payee_id: AccountId,
        amount: Money,
    ) -> LedgerResult<(Account, Transaction)> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let payer_row = sqlx::query(
            "SELECT id, username, role, balance_cents FROM accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(payer_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::NotFound)?;
        let payer = account_from_row(&payer_row)?;

        let payee_exists = sqlx::query("SELECT 1 FROM accounts WHERE id = $1")
            .bind(payee_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if payee_exists.is_none() {
            return Err(LedgerError::NotFound);
        }

        let new_balance = payer
            .balance
            .checked_add(amount.negated())
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;
        if new_balance.is_negative() {
            return Err(LedgerError::InsufficientBalance);
        }

        sqlx::query("UPDATE accounts SET balance_cents = $2 WHERE id = $1")
            .bind(payer_id.as_uuid())
            .bind(new_balance.cents())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let transaction_id = TransactionId::new();
        let inserted = sqlx::query(
            "INSERT INTO transactions (transaction_id, payer_id, payee_id, amount_cents, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id, timestamp",
        )
        .bind(transaction_id.as_uuid())
        .bind(payer_id.as_uuid())
        .bind(payee_id.as_uuid())
        .bind(amount.cents())
        .bind("completed")
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        let transaction = Transaction {
            id: inserted.get::<i64, _>("id"),
            transaction_id,
            payer_id,
            payee_id,
            amount,
            status: TransactionStatus::Completed,
            timestamp: inserted.get::<DateTime<Utc>, _>("timestamp"),
        };

        Ok((
            Account {
                balance: new_balance,
                ..payer
            },
            transaction,
        ))
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), err)]
    async fn create_account(&self, username: &str, role: Role) -> LedgerResult<Account> {
        let account = Account::new(username, role);
        sqlx::query("INSERT INTO accounts (id, username, role, balance_cents) VALUES ($1, $2, $3, 0)")
            .bind(account.id.as_uuid())
            .bind(&account.username)
            .bind(account.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(account)
    }

    async fn account(&self, id: AccountId) -> LedgerResult<Account> {
        let row = sqlx::query("SELECT id, username, role, balance_cents FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::NotFound)?;
        account_from_row(&row)
    }

    async fn account_by_username(&self, username: &str) -> LedgerResult<Option<Account>> {
        let row =
            sqlx::query("SELECT id, username, role, balance_cents FROM accounts WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn accounts_by_role(&self, role: Role) -> LedgerResult<Vec<Account>> {
        let rows = sqlx::query("SELECT id, username, role, balance_cents FROM accounts WHERE role = $1")
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(account_from_row).collect()
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        let rows = sqlx::query("SELECT id, username, role, balance_cents FROM accounts")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(account_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn apply_delta(&self, id: AccountId, delta: Money) -> LedgerResult<Account> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query(
            "SELECT id, username, role, balance_cents FROM accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::NotFound)?;
        let account = account_from_row(&row)?;

        let new_balance = account
            .balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;
        if new_balance.is_negative() {
            return Err(LedgerError::InsufficientBalance);
        }

        sqlx::query("UPDATE accounts SET balance_cents = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(new_balance.cents())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        Ok(Account {
            balance: new_balance,
            ..account
        })
    }

    async fn set_balance(&self, id: AccountId, value: Money) -> LedgerResult<Account> {
        if value.is_negative() {
            return Err(LedgerError::invalid_amount("balance cannot be negative"));
        }

        let row = sqlx::query(
            "UPDATE accounts SET balance_cents = $2 WHERE id = $1 \
             RETURNING id, username, role, balance_cents",
        )
        .bind(id.as_uuid())
        .bind(value.cents())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::NotFound)?;
        account_from_row(&row)
    }

    async fn set_balance_for_role(&self, role: Role, value: Money) -> LedgerResult<u64> {
        if value.is_negative() {
            return Err(LedgerError::invalid_amount("balance cannot be negative"));
        }

        let result = sqlx::query("UPDATE accounts SET balance_cents = $2 WHERE role = $1")
            .bind(role.as_str())
            .bind(value.cents())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn settle_payment(
        &self,
        payer_id: AccountId,
        payee_id: AccountId,
        amount: Money,
    ) -> LedgerResult<(Account, Transaction)> {
        if !amount.is_positive() {
            return Err(LedgerError::invalid_amount("payment amount must be positive"));
        }

        for _ in 0..MAX_ID_RETRIES {
            match self.try_settle(payer_id, payee_id, amount).await {
                Err(LedgerError::DuplicateTransactionId) => {
                    tracing::warn!("transaction id collision, regenerating");
                }
                other => return other,
            }
        }

        tracing::error!(%payer_id, %payee_id, "transaction id retries exhausted");
        Err(LedgerError::settlement("could not generate a unique transaction id"))
    }

    async fn transactions_for_account(
        &self,
        id: AccountId,
        party: TransactionParty,
    ) -> LedgerResult<Vec<Transaction>> {
        let condition = match party {
            TransactionParty::Payer => "payer_id = $1",
            TransactionParty::Payee => "payee_id = $1",
            TransactionParty::Either => "(payer_id = $1 OR payee_id = $1)",
        };
        let sql = format!(
            "SELECT id, transaction_id, payer_id, payee_id, amount_cents, status, timestamp \
             FROM transactions WHERE {condition} ORDER BY timestamp DESC, id DESC"
        );

        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn all_transactions(&self, range: TimeRange) -> LedgerResult<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, transaction_id, payer_id, payee_id, amount_cents, status, timestamp \
             FROM transactions \
             WHERE ($1::timestamptz IS NULL OR timestamp >= $1) \
               AND ($2::timestamptz IS NULL OR timestamp <= $2) \
             ORDER BY timestamp DESC, id DESC",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(transaction_from_row).collect()
    }
}

fn account_from_row(row: &PgRow) -> LedgerResult<Account> {
    let role: String = row.get("role");
    Ok(Account {
        id: AccountId::from_uuid(row.get("id")),
        username: row.get("username"),
        role: role.parse().map_err(LedgerError::storage)?,
        balance: Money::from_cents(row.get::<i64, _>("balance_cents")),
    })
}

fn transaction_from_row(row: &PgRow) -> LedgerResult<Transaction> {
    let status: String = row.get("status");
    let status = match status.as_str() {
        "pending" => TransactionStatus::Pending,
        "completed" => TransactionStatus::Completed,
        "failed" => TransactionStatus::Failed,
        other => return Err(LedgerError::storage(format!("unknown status '{other}'"))),
    };

    Ok(Transaction {
        id: row.get("id"),
        transaction_id: TransactionId::from_uuid(row.get("transaction_id")),
        payer_id: AccountId::from_uuid(row.get("payer_id")),
        payee_id: AccountId::from_uuid(row.get("payee_id")),
        amount: Money::from_cents(row.get::<i64, _>("amount_cents")),
        status,
        timestamp: row.get("timestamp"),
    })
}

fn db_err(err: sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            let constraint = db.constraint().unwrap_or_default();
            if constraint.contains("username") {
                return LedgerError::UsernameTaken;
            }
            if constraint.contains("transaction_id") {
                return LedgerError::DuplicateTransactionId;
            }
        }
        if db.code().as_deref() == Some("23514") {
            return LedgerError::InsufficientBalance;
        }
    }
    LedgerError::storage(err.to_string())
}
