//! `corpcredit-notify` — best-effort notification fan-out.
//!
//! Ephemeral event messages pushed to currently-connected recipients. Delivery
//! guarantee is "at most once, only if connected": nothing is queued for
//! offline recipients and a slow channel never stalls a ledger operation.

pub mod dispatcher;
pub mod notification;

pub use dispatcher::{NotificationDispatcher, Notifier, NullNotifier};
pub use notification::{Notification, NotificationKind};
