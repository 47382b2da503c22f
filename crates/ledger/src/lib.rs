//! `corpcredit-ledger` — ledger mutation and settlement engine.
//!
//! Pure domain logic and store contracts: no HTTP, no SQL. The engine
//! orchestrates funding and payment as validate → mutate → log → notify,
//! against whatever [`store::LedgerStore`] it was constructed with.

pub mod account;
pub mod engine;
pub mod store;
pub mod transaction;

pub use account::Account;
pub use engine::LedgerEngine;
pub use store::{LedgerStore, TimeRange, TransactionParty};
pub use transaction::{Transaction, TransactionStatus};
