//! Notification message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corpcredit_core::AccountId;

/// Kind of event that triggered the push.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A payment was settled (sent to payer and payee).
    Transaction,
    /// A stored balance changed outside a payment (admin funding/reset).
    WalletUpdate,
}

/// One ephemeral push message. Never persisted; lost if the recipient is not
/// connected at delivery time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub recipient_id: AccountId,
}

impl Notification {
    pub fn transaction(recipient_id: AccountId, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Transaction,
            message: message.into(),
            timestamp: Utc::now(),
            recipient_id,
        }
    }

    pub fn wallet_update(recipient_id: AccountId, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::WalletUpdate,
            message: message.into(),
            timestamp: Utc::now(),
            recipient_id,
        }
    }
}
