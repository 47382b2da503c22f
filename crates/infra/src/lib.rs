//! Infrastructure layer: `LedgerStore` implementations.
//!
//! One in-memory store (tests/dev) and one Postgres-backed store (durable),
//! both satisfying the same contract; the binary picks one at startup.

pub mod ledger_store;


pub use ledger_store::{InMemoryLedgerStore, PostgresLedgerStore};
