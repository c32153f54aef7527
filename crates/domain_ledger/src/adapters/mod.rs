//! Store adapters shipped with the ledger domain
//!
//! The PostgreSQL adapter lives in `infra_db`; this module only holds the
//! dependency-free in-memory store.

pub mod memory;

pub use memory::InMemoryLedgerStore;
