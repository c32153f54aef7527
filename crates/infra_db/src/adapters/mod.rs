//! Domain Adapters
//!
//! Adapter implementations connecting the ledger's store ports to PostgreSQL.
//! Each adapter implements the port traits, translates between domain models
//! and row structs, and uses the repository layer for the SQL.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerAdapter;
//! use domain_ledger::AccountStore;
//!
//! let adapter = PostgresLedgerAdapter::new(pool);
//! let accounts = adapter.list_accounts(owner).await?;
//! ```

pub mod ledger;

pub use ledger::PostgresLedgerAdapter;
