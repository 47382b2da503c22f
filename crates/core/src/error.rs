//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger domain.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Keep this focused on deterministic business failures (validation, invariants,
/// authorization shape). Transport concerns map onto it at the API boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A referenced account or transaction does not exist.
    #[error("not found")]
    NotFound,

    /// A debit would drive a balance below zero. Expected business outcome,
    /// not a crash condition.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Malformed, non-positive-where-required, or precision-violating amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The acting or referenced account has the wrong role for the operation.
    #[error("unauthorized")]
    Unauthorized,

    /// Registration attempted with a username that already exists.
    #[error("username already taken")]
    UsernameTaken,

    /// A freshly generated transaction id collided with a stored one.
    /// Internal: callers regenerate and retry, this never reaches the API.
    #[error("duplicate transaction id")]
    DuplicateTransactionId,

    /// The debit-then-record unit could not be completed consistently.
    /// Not locally recoverable; surfaced distinctly so an operator can reconcile.
    #[error("settlement failure: {0}")]
    SettlementFailure(String),

    /// Backing store failure (IO, pool, lock poisoning).
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn settlement(msg: impl Into<String>) -> Self {
        Self::SettlementFailure(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
