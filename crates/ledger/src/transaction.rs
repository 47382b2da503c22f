//! Settled transaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corpcredit_core::{AccountId, Money, TransactionId};

/// Settlement status of a transaction row.
///
/// The current flow only ever persists `Completed` (a failed payment leaves no
/// row at all). `Pending` and `Failed` stay in the schema for future
/// asynchronous settlement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// One settled payment. Created exactly once by the ledger engine, immutable
/// thereafter, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Internal storage-assigned sequence number.
    pub id: i64,
    /// Externally visible unique identifier; never reused.
    pub transaction_id: TransactionId,
    pub payer_id: AccountId,
    pub payee_id: AccountId,
    /// Strictly positive; equals the magnitude of the payer's balance delta.
    pub amount: Money,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}
