//! Repository implementations
//!
//! Repositories encapsulate the SQL and map between database rows and plain
//! row structs; translation to domain types happens in the adapters.

pub mod ledger;

pub use ledger::LedgerRepository;
