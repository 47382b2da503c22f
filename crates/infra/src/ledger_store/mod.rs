//! Ledger store backends.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;

/// Upper bound on transaction-id regeneration after a unique-key collision.
///
/// UUIDv7 collisions are astronomically unlikely; exhausting this many retries
/// means something is structurally wrong with the store and settlement aborts.
pub(crate) const MAX_ID_RETRIES: u32 = 5;
