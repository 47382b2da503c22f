//! Live recipient registry and fire-and-forget dispatch.
//!
//! One bounded channel per connected recipient; a per-connection task drains
//! the receiver onto the transport (WebSocket). Dispatch never blocks and
//! never fails the caller: a full or closed channel means "recipient offline".

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;

use corpcredit_core::{AccountId, ConnectionId};

use crate::notification::Notification;

/// Per-recipient buffer before backpressure drops messages.
const CHANNEL_CAPACITY: usize = 32;

/// Seam between the ledger engine and the push transport.
pub trait Notifier: Send + Sync {
    /// Best-effort push; must never block or propagate failure.
    fn dispatch(&self, notification: Notification);
}

struct Registration {
    connection_id: ConnectionId,
    sender: mpsc::Sender<Notification>,
}

/// Registry of currently-connected notification recipients.
///
/// At most one live channel per account: a new registration replaces the old
/// one, so only the most recent connection receives pushes.
#[derive(Default)]
pub struct NotificationDispatcher {
    registry: Mutex<HashMap<AccountId, Registration>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate an account with a fresh delivery channel.
    ///
    /// Returns the connection handle (for `unregister`) and the receiving end
    /// the connection task drains onto its socket.
    pub fn register(&self, account_id: AccountId) -> (ConnectionId, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let connection_id = ConnectionId::new();

        let mut registry = self.lock_registry();
        registry.insert(
            account_id,
            Registration {
                connection_id,
                sender: tx,
            },
        );

        tracing::debug!(%account_id, %connection_id, "notification channel registered");
        (connection_id, rx)
    }

    /// Remove the registration owning `connection_id`, if still current.
    ///
    /// A stale handle (already replaced by a newer connection for the same
    /// account) is a no-op, so a late close can never evict a live channel.
    pub fn unregister(&self, connection_id: ConnectionId) {
        let mut registry = self.lock_registry();
        registry.retain(|_, reg| reg.connection_id != connection_id);
    }

    /// Number of currently registered recipients.
    pub fn connected(&self) -> usize {
        self.lock_registry().len()
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, HashMap<AccountId, Registration>> {
        // A poisoned registry only loses best-effort pushes; keep serving.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for NotificationDispatcher {
    fn dispatch(&self, notification: Notification) {
        let registry = self.lock_registry();
        let Some(reg) = registry.get(&notification.recipient_id) else {
            // Recipient offline: drop silently, no retry, no persistence.
            return;
        };

        if let Err(err) = reg.sender.try_send(notification) {
            tracing::debug!(error = %err, "notification dropped (channel full or closing)");
        }
    }
}

/// No-op notifier for wiring the engine without a live socket layer.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn dispatch(&self, _notification: Notification) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_exact_payload_to_registered_channel() {
        let dispatcher = NotificationDispatcher::new();
        let recipient = AccountId::new();
        let (_conn, mut rx) = dispatcher.register(recipient);

        let sent = Notification::transaction(recipient, "payment received");
        dispatcher.dispatch(sent.clone());

        let got = rx.recv().await.unwrap();
        assert_eq!(got, sent);
    }

    #[tokio::test]
    async fn dispatch_to_unregistered_recipient_is_a_no_op() {
        let dispatcher = NotificationDispatcher::new();
        dispatcher.dispatch(Notification::wallet_update(AccountId::new(), "hello"));
        assert_eq!(dispatcher.connected(), 0);
    }

    #[tokio::test]
    async fn new_registration_replaces_the_old_channel() {
        let dispatcher = NotificationDispatcher::new();
        let recipient = AccountId::new();
        let (_old_conn, mut old_rx) = dispatcher.register(recipient);
        let (_new_conn, mut new_rx) = dispatcher.register(recipient);

        dispatcher.dispatch(Notification::transaction(recipient, "to the new channel"));

        assert!(new_rx.recv().await.is_some());
        assert!(old_rx.recv().await.is_none()); // old sender dropped on replace
    }

    #[tokio::test]
    async fn stale_unregister_leaves_current_channel_alone() {
        let dispatcher = NotificationDispatcher::new();
        let recipient = AccountId::new();
        let (old_conn, _old_rx) = dispatcher.register(recipient);
        let (_new_conn, mut new_rx) = dispatcher.register(recipient);

        dispatcher.unregister(old_conn);
        assert_eq!(dispatcher.connected(), 1);

        dispatcher.dispatch(Notification::transaction(recipient, "still live"));
        assert!(new_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn unregister_removes_the_live_channel() {
        let dispatcher = NotificationDispatcher::new();
        let recipient = AccountId::new();
        let (conn, _rx) = dispatcher.register(recipient);

        dispatcher.unregister(conn);
        assert_eq!(dispatcher.connected(), 0);
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_blocking() {
        let dispatcher = NotificationDispatcher::new();
        let recipient = AccountId::new();
        let (_conn, rx) = dispatcher.register(recipient);

        // Nobody drains rx; overflowing the buffer must not block the caller.
        for _ in 0..(CHANNEL_CAPACITY + 10) {
            dispatcher.dispatch(Notification::wallet_update(recipient, "burst"));
        }
        drop(rx);
    }
}
