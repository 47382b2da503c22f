//! `corpcredit-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::{LedgerError, LedgerResult};
pub use id::{AccountId, ConnectionId, TransactionId};
pub use money::Money;
